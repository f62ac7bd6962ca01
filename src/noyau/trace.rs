// src/noyau/trace.rs
//
// Balayage d’une fonction : f(x) pour x = début, suivant(début), ... <= fin.
// Le pas s’applique par addition ("0.5"), produit ("2*") ou puissance ("2^").
// L’expression est compilée une seule fois ; seule l’inconnue change.

use num_complex::Complex64;
use thiserror::Error;
use tracing::warn;

use super::erreur::Echec;
use super::eval::solve_once;
use super::expr::ExprCompilee;
use super::registre::Registre;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pas {
    Ajout(f64),
    Produit(f64),
    Puissance(f64),
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ErreurTrace {
    #[error("le début ({debut}) dépasse la fin ({fin})")]
    BornesInversees { debut: f64, fin: f64 },

    #[error("le pas ne peut pas être nul")]
    PasNul,

    #[error("le pas doit être réel (reçu {0})")]
    PasComplexe(Complex64),

    #[error("pas illisible : {0}")]
    PasIllisible(#[from] Echec),

    #[error("'{0}' n’est pas une inconnue de la fonction")]
    InconnueAbsente(String),
}

impl Pas {
    /// "0.5" -> Ajout, "2*" -> Produit, "2^" -> Puissance ("3+" = Ajout explicite).
    /// La valeur peut être une expression ("pi/4*").
    pub fn lire(texte: &str, registre: &Registre) -> Result<Self, ErreurTrace> {
        let t = texte.trim();
        let (corps, genre): (&str, fn(f64) -> Pas) = match t.chars().last() {
            Some('*') => (&t[..t.len() - 1], Pas::Produit),
            Some('^') => (&t[..t.len() - 1], Pas::Puissance),
            Some('+') => (&t[..t.len() - 1], Pas::Ajout),
            _ => (t, Pas::Ajout),
        };

        let v = solve_once(corps, registre)?;
        if v.im != 0.0 {
            return Err(ErreurTrace::PasComplexe(v));
        }
        if v.re == 0.0 {
            return Err(ErreurTrace::PasNul);
        }
        Ok(genre(v.re))
    }

    pub fn suivant(self, x: f64) -> f64 {
        match self {
            Pas::Ajout(p) => x + p,
            Pas::Produit(p) => x * p,
            Pas::Puissance(p) => x.powf(p),
        }
    }
}

/// Un point du balayage ; une erreur ne termine pas le balayage.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: Result<Complex64, Echec>,
}

pub struct Balayage<'a> {
    expr: &'a mut ExprCompilee,
    variable: String,
    x: f64,
    fin: f64,
    pas: Pas,
    complexe_permis: bool,
    termine: bool,
}

/// Prépare le balayage de `expr` selon `variable` sur [debut, fin].
pub fn balayer<'a>(
    expr: &'a mut ExprCompilee,
    variable: &str,
    debut: f64,
    fin: f64,
    pas: Pas,
    complexe_permis: bool,
) -> Result<Balayage<'a>, ErreurTrace> {
    if debut > fin {
        return Err(ErreurTrace::BornesInversees { debut, fin });
    }
    if matches!(pas, Pas::Ajout(p) | Pas::Produit(p) | Pas::Puissance(p) if p == 0.0) {
        return Err(ErreurTrace::PasNul);
    }
    if expr.unknown(variable).is_none() {
        return Err(ErreurTrace::InconnueAbsente(variable.to_string()));
    }

    Ok(Balayage {
        expr,
        variable: variable.to_string(),
        x: debut,
        fin,
        pas,
        complexe_permis,
        termine: false,
    })
}

impl Iterator for Balayage<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.termine || !(self.x <= self.fin) {
            return None;
        }

        let x = self.x;
        let y = match self.expr.set_unknown(&self.variable, x) {
            Ok(()) => self.expr.evaluate(self.complexe_permis),
            Err(e) => Err(Echec::from(e)),
        };

        let suivant = self.pas.suivant(x);
        if !(suivant > x) {
            // produit depuis 0, facteur < 1, puissance sur [0, 1], ...
            warn!(x, suivant, pas = ?self.pas, "pas sans progression : balayage arrêté");
            self.termine = true;
        }
        self.x = suivant;

        Some(Point { x, y })
    }
}
