//! src/app/etat.rs
//!
//! État de session (sans rendu).
//!
//! Rôle : posséder le registre (ans, variables, fonctions) et les réglages,
//! exécuter une ligne et rendre une `Sortie` ou une erreur.
//!
//! Lignes reconnues :
//! - `expr`            : calcule, met à jour ans
//! - `nom = expr`      : variable (valeur figée au moment de l’affectation)
//! - `f(x, y) = corps` : fonction utilisateur (corps vérifié avant d’être retenu)
//! - `trace f; début; fin; pas`  : balayage de f(x) ("0.5", "2*", "2^")
//! - `derivee f; x0`             : f'(x0), met à jour ans
//! - `integrale f; a; b`         : intégrale de f sur [a, b], met à jour ans

use num_complex::Complex64;
use thiserror::Error;
use tracing::{debug, warn};

use crate::noyau::analyse::{derivee, integrale, INTERVALLES_SIMPSON};
use crate::noyau::jetons::retirer_blancs;
use crate::noyau::trace::{balayer, ErreurTrace, Pas, Point};
use crate::noyau::validation::valider;
use crate::noyau::{compile, Echec, ErreurRegistre, ExprCompilee, Registre};

/// Chiffres significatifs par défaut (comme printf("%.14g")).
pub const CHIFFRES_DEFAUT: usize = 14;

/// Garde-fou : au-delà, f64 n’a plus de chiffres exacts à montrer.
pub const CHIFFRES_MAX: usize = 17;

/// Inconnue des commandes trace / derivee / integrale.
pub const VARIABLE: &str = "x";

/// Garde-fou : nombre de points d’un balayage.
pub const POINTS_MAX: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct Reglages {
    /// Chiffres significatifs affichés (1 à 17)
    #[arg(short = 'c', long = "chiffres", env = "CALC_CHIFFRES", default_value_t = CHIFFRES_DEFAUT)]
    pub chiffres: usize,

    /// Réel strict : aucun repli complexe
    #[arg(long = "reel", env = "CALC_REEL")]
    pub reel: bool,

    /// Affiche aussi la fraction (3/4) quand le résultat en a une courte
    #[arg(short = 'f', long = "fractions", env = "CALC_FRACTIONS")]
    pub fractions: bool,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            chiffres: CHIFFRES_DEFAUT,
            reel: false,
            fractions: false,
        }
    }
}

impl Reglages {
    /// Garde-fou : 1 <= chiffres <= CHIFFRES_MAX.
    pub fn set_chiffres(&mut self, chiffres: usize) {
        self.chiffres = chiffres.clamp(1, CHIFFRES_MAX);
    }

    pub fn complexe_permis(&self) -> bool {
        !self.reel
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Sortie {
    Valeur(Complex64),
    Variable { nom: String, valeur: Complex64 },
    Fonction { nom: String, parametres: Vec<String> },
    /// `fonction` : texte validé de f(x).
    Trace { fonction: String, points: Vec<Point> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Commande {
    Trace,
    Derivee,
    Integrale,
}

impl Commande {
    fn depuis_mot(mot: &str) -> Option<Self> {
        match mot {
            "trace" => Some(Commande::Trace),
            "derivee" => Some(Commande::Derivee),
            "integrale" => Some(Commande::Integrale),
            _ => None,
        }
    }

    fn nb_arguments(self) -> usize {
        match self {
            Commande::Trace => 4,
            Commande::Derivee => 2,
            Commande::Integrale => 3,
        }
    }

    fn usage(self) -> &'static str {
        match self {
            Commande::Trace => "trace f(x); début; fin; pas",
            Commande::Derivee => "derivee f(x); x0",
            Commande::Integrale => "integrale f(x); a; b",
        }
    }
}

/// `mot arg; arg; ...` ; sans ';' la ligne reste une expression ou une affectation.
fn lire_commande(ligne: &str) -> Option<(Commande, Vec<&str>)> {
    let (mot, reste) = ligne.split_once(char::is_whitespace)?;
    let commande = Commande::depuis_mot(mot)?;
    reste
        .contains(';')
        .then(|| (commande, reste.split(';').map(str::trim).collect()))
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ErreurSession {
    #[error("entrée vide")]
    Vide,

    /// `reference` : texte auquel se rapportent les positions des erreurs.
    #[error("{echec}")]
    Calcul { reference: String, echec: Echec },

    #[error(transparent)]
    Registre(#[from] ErreurRegistre),

    #[error("définition invalide : '{0}'")]
    Definition(String),

    #[error(transparent)]
    Trace(#[from] ErreurTrace),

    #[error("usage : {0}")]
    Commande(&'static str),

    #[error("'{0}' doit être réel")]
    BorneComplexe(String),
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    registre: Registre,
    reglages: Reglages,
}

impl Session {
    pub fn new(reglages: Reglages) -> Self {
        let mut s = Self {
            registre: Registre::new(),
            reglages: Reglages::default(),
        };
        s.set_reglages(reglages);
        s
    }

    pub fn registre(&self) -> &Registre {
        &self.registre
    }

    pub fn reglages(&self) -> &Reglages {
        &self.reglages
    }

    pub fn set_reglages(&mut self, reglages: Reglages) {
        let chiffres = reglages.chiffres;
        self.reglages = reglages;
        self.reglages.set_chiffres(chiffres);
    }

    pub fn ans(&self) -> Complex64 {
        self.registre.ans()
    }

    /* ------------------------ Exécution d’une ligne ------------------------ */

    pub fn executer(&mut self, ligne: &str) -> Result<Sortie, ErreurSession> {
        let ligne = ligne.trim();
        if ligne.is_empty() {
            return Err(ErreurSession::Vide);
        }

        if let Some((commande, arguments)) = lire_commande(ligne) {
            return self.commande(commande, &arguments);
        }

        match ligne.split_once('=') {
            Some((gauche, droite)) => self.definir(gauche.trim(), droite.trim()),
            None => {
                let v = calculer(&self.registre, ligne, self.reglages.complexe_permis())?;
                self.registre.set_ans(v);
                debug!(ligne, ans = %v, "ans mis à jour");
                Ok(Sortie::Valeur(v))
            }
        }
    }

    fn definir(&mut self, gauche: &str, droite: &str) -> Result<Sortie, ErreurSession> {
        if droite.is_empty() {
            return Err(ErreurSession::Definition(gauche.to_string()));
        }

        // f(x, y) = corps
        if let Some((nom, reste)) = gauche.split_once('(') {
            let params = reste
                .strip_suffix(')')
                .ok_or_else(|| ErreurSession::Definition(gauche.to_string()))?;
            let nom = nom.trim();
            let parametres: Vec<String> =
                params.split(',').map(|p| p.trim().to_string()).collect();

            // essai dans une copie : le registre ne change qu’après un corps valide
            let mut essai = self.registre.clone();
            essai.definir_fonction(nom, parametres.clone(), droite)?;
            let noms: Vec<&str> = parametres.iter().map(String::as_str).collect();
            compile(droite, &essai, &noms).map_err(|e| ErreurSession::Calcul {
                reference: reference(&essai, droite),
                echec: Echec::from(e),
            })?;

            self.registre = essai;
            debug!(nom, ?parametres, "fonction définie");
            return Ok(Sortie::Fonction {
                nom: nom.to_string(),
                parametres,
            });
        }

        // nom = expr
        let valeur = calculer(&self.registre, droite, self.reglages.complexe_permis())?;
        self.registre.definir_variable(gauche, valeur)?;
        debug!(nom = gauche, %valeur, "variable définie");
        Ok(Sortie::Variable {
            nom: gauche.to_string(),
            valeur,
        })
    }

    /* ------------------------ Commandes ------------------------ */

    fn commande(&mut self, commande: Commande, arguments: &[&str]) -> Result<Sortie, ErreurSession> {
        if arguments.len() != commande.nb_arguments() || arguments.iter().any(|a| a.is_empty()) {
            return Err(ErreurSession::Commande(commande.usage()));
        }

        let texte = arguments[0];
        let mut f = compile(texte, &self.registre, &[VARIABLE]).map_err(|e| ErreurSession::Calcul {
            reference: reference(&self.registre, texte),
            echec: Echec::from(e),
        })?;

        match commande {
            Commande::Trace => {
                let debut = self.valeur_reelle(arguments[1])?;
                let fin = self.valeur_reelle(arguments[2])?;
                let pas = Pas::lire(arguments[3], &self.registre)?;
                let complexe = self.reglages.complexe_permis();

                let mut points: Vec<Point> = balayer(&mut f, VARIABLE, debut, fin, pas, complexe)?
                    .take(POINTS_MAX + 1)
                    .collect();
                if points.len() > POINTS_MAX {
                    points.truncate(POINTS_MAX);
                    warn!(max = POINTS_MAX, fonction = texte, "balayage tronqué");
                }
                debug!(fonction = texte, points = points.len(), "balayage");
                Ok(Sortie::Trace {
                    fonction: f.source().to_string(),
                    points,
                })
            }
            Commande::Derivee => {
                let x = self.valeur_reelle(arguments[1])?;
                let v = derivee(&mut f, VARIABLE, x).map_err(|echec| self.echec(&f, echec))?;
                Ok(self.retenir(Complex64::from(v)))
            }
            Commande::Integrale => {
                let a = self.valeur_reelle(arguments[1])?;
                let b = self.valeur_reelle(arguments[2])?;
                let v = integrale(&mut f, VARIABLE, a, b, INTERVALLES_SIMPSON)
                    .map_err(|echec| self.echec(&f, echec))?;
                Ok(self.retenir(Complex64::from(v)))
            }
        }
    }

    /// Borne ou point : expression à valeur réelle.
    fn valeur_reelle(&self, texte: &str) -> Result<f64, ErreurSession> {
        let v = calculer(&self.registre, texte, self.reglages.complexe_permis())?;
        if v.im != 0.0 {
            return Err(ErreurSession::BorneComplexe(texte.to_string()));
        }
        Ok(v.re)
    }

    fn echec(&self, f: &ExprCompilee, echec: Echec) -> ErreurSession {
        ErreurSession::Calcul {
            reference: f.source().to_string(),
            echec,
        }
    }

    fn retenir(&mut self, v: Complex64) -> Sortie {
        self.registre.set_ans(v);
        debug!(ans = %v, "ans mis à jour");
        Sortie::Valeur(v)
    }
}

fn calculer(registre: &Registre, texte: &str, complexe_permis: bool) -> Result<Complex64, ErreurSession> {
    compile(texte, registre, &[])
        .map_err(Echec::from)
        .and_then(|mut e| e.evaluate(complexe_permis))
        .map_err(|echec| ErreurSession::Calcul {
            reference: reference(registre, texte),
            echec,
        })
}

/// Texte auquel se rapportent les positions : la forme validée si elle existe,
/// sinon l’entrée sans blancs (erreurs de la validation elle-même).
fn reference(registre: &Registre, texte: &str) -> String {
    let brut = retirer_blancs(texte);
    valider(&brut, registre).unwrap_or(brut)
}
