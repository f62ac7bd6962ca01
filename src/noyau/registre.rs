// src/noyau/registre.rs
//
// Registre des noms : constantes, réponse précédente (ans), variables
// utilisateur et fonctions utilisateur.
//
// Le registre est un objet de contexte passé explicitement à compile() :
// pas d’état global. Les variables sont lues au moment de la construction
// (copie de la valeur), donc une expression compilée ne voit pas les
// affectations ultérieures.

use std::collections::BTreeMap;
use std::f64::consts::{E, PI};

use num_complex::Complex64;
use thiserror::Error;

use super::fonctions::Interne;
use super::jetons::est_debut_nom;

/// Nom de la réponse précédente.
pub const ANS: &str = "ans";

#[derive(Clone, Debug, PartialEq)]
pub struct FonctionUtilisateur {
    pub parametres: Vec<String>,
    pub corps: String,
}

#[derive(Clone, Debug, PartialEq)]
enum Entree {
    Constante(Complex64),
    Variable(Complex64),
    Fonction(FonctionUtilisateur),
}

/// Résultat d’une recherche par nom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution<'a> {
    Constante(Complex64),
    Variable(Complex64),
    FonctionUtilisateur(&'a FonctionUtilisateur),
    Interne(Interne),
    Introuvable,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErreurRegistre {
    #[error("'{0}' est en lecture seule")]
    LectureSeule(String),

    #[error("'{0}' n’est pas un nom valide (lettres et '_' seulement)")]
    NomInvalide(String),

    #[error("'{0}' est un nom réservé (fonction interne ou constante)")]
    NomReserve(String),

    #[error("'{0}' n’existe pas")]
    Introuvable(String),

    #[error("paramètres invalides pour '{0}'")]
    ParametresInvalides(String),
}

#[derive(Clone, Debug)]
pub struct Registre {
    entrees: BTreeMap<String, Entree>,
}

impl Default for Registre {
    fn default() -> Self {
        Self::new()
    }
}

impl Registre {
    /// Registre de base : pi, e, i (constantes) et ans = 0.
    pub fn new() -> Self {
        let mut entrees = BTreeMap::new();
        entrees.insert("pi".to_string(), Entree::Constante(Complex64::from(PI)));
        entrees.insert("e".to_string(), Entree::Constante(Complex64::from(E)));
        entrees.insert("i".to_string(), Entree::Constante(Complex64::i()));
        entrees.insert(ANS.to_string(), Entree::Constante(Complex64::from(0.0)));
        Self { entrees }
    }

    pub fn resolve_name(&self, nom: &str) -> Resolution<'_> {
        if let Some(f) = Interne::depuis_nom(nom) {
            return Resolution::Interne(f);
        }
        match self.entrees.get(nom) {
            Some(Entree::Constante(v)) => Resolution::Constante(*v),
            Some(Entree::Variable(v)) => Resolution::Variable(*v),
            Some(Entree::Fonction(f)) => Resolution::FonctionUtilisateur(f),
            None => Resolution::Introuvable,
        }
    }

    /// Vrai si `nom(` est un appel (fonction interne ou utilisateur).
    pub fn est_fonction(&self, nom: &str) -> bool {
        matches!(
            self.resolve_name(nom),
            Resolution::Interne(_) | Resolution::FonctionUtilisateur(_)
        )
    }

    pub fn est_lecture_seule(&self, nom: &str) -> bool {
        matches!(self.entrees.get(nom), Some(Entree::Constante(_)))
    }

    fn verifier_nom(&self, nom: &str) -> Result<(), ErreurRegistre> {
        if nom.is_empty() || !nom.chars().all(est_debut_nom) {
            return Err(ErreurRegistre::NomInvalide(nom.to_string()));
        }
        if Interne::depuis_nom(nom).is_some() {
            return Err(ErreurRegistre::NomReserve(nom.to_string()));
        }
        if self.est_lecture_seule(nom) {
            return Err(ErreurRegistre::LectureSeule(nom.to_string()));
        }
        Ok(())
    }

    pub fn definir_variable(&mut self, nom: &str, valeur: Complex64) -> Result<(), ErreurRegistre> {
        self.verifier_nom(nom)?;
        self.entrees
            .insert(nom.to_string(), Entree::Variable(valeur));
        Ok(())
    }

    /// Enregistre `nom(p1, p2, ...) = corps`. Le corps n’est compilé qu’aux sites d’appel.
    pub fn definir_fonction(
        &mut self,
        nom: &str,
        parametres: Vec<String>,
        corps: impl Into<String>,
    ) -> Result<(), ErreurRegistre> {
        self.verifier_nom(nom)?;

        let params_ok = !parametres.is_empty()
            && parametres.iter().enumerate().all(|(k, p)| {
                !p.is_empty()
                    && p.chars().all(est_debut_nom)
                    && !parametres[..k].contains(p)
            });
        if !params_ok {
            return Err(ErreurRegistre::ParametresInvalides(nom.to_string()));
        }
        // un paramètre ne masque ni une fonction interne ni une constante
        if let Some(p) = parametres
            .iter()
            .find(|p| Interne::depuis_nom(p).is_some() || self.est_lecture_seule(p))
        {
            return Err(ErreurRegistre::NomReserve(p.clone()));
        }

        self.entrees.insert(
            nom.to_string(),
            Entree::Fonction(FonctionUtilisateur {
                parametres,
                corps: corps.into(),
            }),
        );
        Ok(())
    }

    pub fn supprimer(&mut self, nom: &str) -> Result<(), ErreurRegistre> {
        if self.est_lecture_seule(nom) {
            return Err(ErreurRegistre::LectureSeule(nom.to_string()));
        }
        self.entrees
            .remove(nom)
            .map(|_| ())
            .ok_or_else(|| ErreurRegistre::Introuvable(nom.to_string()))
    }

    /// Seul chemin d’écriture de `ans` (lecture seule pour l’utilisateur).
    pub fn set_ans(&mut self, valeur: Complex64) {
        self.entrees
            .insert(ANS.to_string(), Entree::Constante(valeur));
    }

    pub fn ans(&self) -> Complex64 {
        match self.entrees.get(ANS) {
            Some(Entree::Constante(v)) => *v,
            _ => Complex64::from(0.0),
        }
    }

    /// Noms définis par l’utilisateur (variables puis fonctions, ordre alphabétique).
    pub fn noms_utilisateur(&self) -> impl Iterator<Item = &str> {
        self.entrees
            .iter()
            .filter(|(_, e)| !matches!(e, Entree::Constante(_)))
            .map(|(n, _)| n.as_str())
    }
}
