// src/noyau/expr.rs
//
// Expression compilée : liste ordonnée de sous-expressions (la plus profonde
// d’abord, la plus externe en dernier), chacune portant sa chaîne de noeuds.
//
// Références croisées = indices, jamais d’alias :
// - Terme::Sous(id)      -> résultat de la sous-expression id
// - Terme::Inconnue(k)   -> case k de la table des inconnues
// Dupliquer une expression = copie profonde des tables (Clone).

use num_complex::Complex64;

use super::erreur::{ErreurCalcul, GenreErreur};
use super::fonctions::Interne;
use super::jetons::Operateur;
use super::reduction::Chantier;

/// Ce que désigne un opérande.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Terme {
    Nombre(Complex64),
    Inconnue(usize),
    Sous(usize),
}

/// Opérande d’un noeud : terme + signe replié + factorielles postfixées.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Operande {
    pub terme: Terme,
    pub negatif: bool,
    pub factorielles: u8,
    pub position: usize,
}

impl Operande {
    pub fn new(terme: Terme, position: usize) -> Self {
        Self {
            terme,
            negatif: false,
            factorielles: 0,
            position,
        }
    }
}

/// Un opérateur et ses deux opérandes, au sein d’un seul niveau d’imbrication.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Noeud {
    pub operateur: Operateur,
    pub priorite: u8,
    /// Position de l’opérateur dans la chaîne validée.
    pub position: usize,
    pub gauche: Operande,
    pub droite: Operande,
}

#[derive(Clone, Debug)]
pub enum Fonction {
    Interne(Interne),
    /// Corps compilé une fois au site d’appel, paramètres = inconnues du corps.
    Utilisateur {
        nom: String,
        corps: Box<ExprCompilee>,
    },
}

impl Fonction {
    pub fn nom(&self) -> &str {
        match self {
            Fonction::Interne(f) => f.nom(),
            Fonction::Utilisateur { nom, .. } => nom,
        }
    }
}

/// Post-traitement d’une sous-expression : `nom(...)`.
#[derive(Clone, Debug)]
pub struct Appel {
    pub fonction: Fonction,
    /// Position du nom de la fonction.
    pub position: usize,
    /// Sous-expressions des arguments précédents (la dernière est celle qui porte l’appel).
    pub arguments: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct SousExpr {
    /// Contenu [debut, fin) dans la chaîne validée.
    pub debut: usize,
    pub fin: usize,
    pub profondeur: usize,
    pub noeuds: Vec<Noeud>,
    /// Contenu réduit à un seul opérande (aucun noeud).
    pub seul: Option<Operande>,
    pub appel: Option<Appel>,
    /// Sous-expression qui lit notre résultat (None pour la dernière).
    pub parent: Option<usize>,
    pub derniere: bool,
}

impl SousExpr {
    pub(crate) fn vide(debut: usize, fin: usize, profondeur: usize) -> Self {
        Self {
            debut,
            fin,
            profondeur,
            noeuds: Vec::new(),
            seul: None,
            appel: None,
            parent: None,
            derniere: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub sous: usize,
    pub position: usize,
}

#[derive(Clone, Debug)]
pub struct Inconnue {
    pub nom: String,
    pub valeur: Complex64,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Clone, Debug)]
pub struct ExprCompilee {
    pub(crate) source: String,
    pub(crate) sous: Vec<SousExpr>,
    pub(crate) inconnues: Vec<Inconnue>,
    /// Contient l’unité imaginaire : la passe réelle est inutile.
    pub(crate) imaginaire: bool,
    /// Contient % ou ! : pas de repli complexe.
    pub(crate) reel_seulement: bool,
    pub(crate) reel: Chantier<f64>,
    pub(crate) complexe: Chantier<Complex64>,
}

impl ExprCompilee {
    pub(crate) fn new(source: String, sous: Vec<SousExpr>, inconnues: Vec<Inconnue>) -> Self {
        let n = sous.len();
        Self {
            source,
            sous,
            inconnues,
            imaginaire: false,
            reel_seulement: false,
            reel: Chantier::new(n),
            complexe: Chantier::new(n),
        }
    }

    /// Chaîne validée (multiplications implicites insérées) : référence des positions.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn sous_expressions(&self) -> &[SousExpr] {
        &self.sous
    }

    pub fn nb_inconnues(&self) -> usize {
        self.inconnues.len()
    }

    pub fn inconnues(&self) -> impl Iterator<Item = &str> {
        self.inconnues.iter().map(|u| u.nom.as_str())
    }

    pub fn occurrences(&self, nom: &str) -> &[Occurrence] {
        self.inconnues
            .iter()
            .find(|u| u.nom == nom)
            .map(|u| u.occurrences.as_slice())
            .unwrap_or(&[])
    }

    pub fn est_imaginaire(&self) -> bool {
        self.imaginaire
    }

    pub fn est_reel_seulement(&self) -> bool {
        self.reel_seulement
    }

    /// Réécrit la valeur d’une inconnue sans toucher à la structure.
    pub fn set_unknown(
        &mut self,
        nom: &str,
        valeur: impl Into<Complex64>,
    ) -> Result<(), ErreurCalcul> {
        let case = self
            .inconnues
            .iter_mut()
            .find(|u| u.nom == nom)
            .ok_or_else(|| {
                ErreurCalcul::compilation(
                    GenreErreur::NomIndefini,
                    0,
                    format!("'{nom}' n’est pas une inconnue de cette expression"),
                )
            })?;
        case.valeur = valeur.into();
        Ok(())
    }

    pub fn unknown(&self, nom: &str) -> Option<Complex64> {
        self.inconnues.iter().find(|u| u.nom == nom).map(|u| u.valeur)
    }

    /// Copie profonde indépendante (tables indexées, aucun alias).
    pub fn duplicate(&self) -> Self {
        self.clone()
    }
}
