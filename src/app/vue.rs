// src/app/vue.rs
//
// Vue texte (terminal)
// --------------------
// - Résultat : "= 0.75" (+ "  [3/4]" si fractions demandées)
// - Trace    : "f(x) = x^2" puis une ligne "f(0.5) = 0.25" par point
// - Erreur   : texte de référence, caret sous la position, puis le message
//
//     2*pi+5/0
//           ^
//     hors domaine : division par zéro

use crate::noyau::format::{
    en_fraction, format_complexe, format_fraction, format_reel, DENOMINATEUR_MAX,
};
use crate::noyau::trace::Point;
use crate::noyau::ErreurCalcul;

use super::etat::{ErreurSession, Session, Sortie, VARIABLE};

/// Abscisses d’un balayage : forme courte (%g).
const CHIFFRES_ABSCISSE: usize = 6;

impl Session {
    pub fn rendre_sortie(&self, sortie: &Sortie) -> String {
        let chiffres = self.reglages().chiffres;

        match sortie {
            Sortie::Valeur(v) => {
                let mut s = format!("= {}", format_complexe(*v, chiffres));
                if self.reglages().fractions && v.im == 0.0 {
                    if let Some(r) = en_fraction(v.re, DENOMINATEUR_MAX).filter(|r| !r.is_integer()) {
                        s.push_str(&format!("  [{}]", format_fraction(&r)));
                    }
                }
                s
            }
            Sortie::Variable { nom, valeur } => {
                format!("{nom} = {}", format_complexe(*valeur, chiffres))
            }
            Sortie::Fonction { nom, parametres } => {
                format!("{nom}({}) définie", parametres.join(", "))
            }
            Sortie::Trace { fonction, points } => {
                let mut lignes = vec![format!("f({VARIABLE}) = {fonction}")];
                lignes.extend(points.iter().map(|p| ligne_point(p, chiffres)));
                lignes.join("\n")
            }
        }
    }

    pub fn rendre_erreur(&self, erreur: &ErreurSession) -> String {
        match erreur {
            ErreurSession::Calcul { reference, echec } => echec
                .erreurs
                .iter()
                .map(|e| bloc_erreur(reference, e))
                .collect::<Vec<_>>()
                .join("\n"),
            autre => format!("erreur : {autre}"),
        }
    }
}

fn ligne_point(p: &Point, chiffres: usize) -> String {
    let x = format_reel(p.x, CHIFFRES_ABSCISSE);
    match &p.y {
        Ok(v) => format!("f({x}) = {}", format_complexe(*v, chiffres)),
        Err(echec) => match echec.premiere() {
            Some(e) => format!("f({x}) = erreur ({})", e.message),
            None => format!("f({x}) = erreur"),
        },
    }
}

/// Trois lignes : référence, caret, message.
fn bloc_erreur(reference: &str, e: &ErreurCalcul) -> String {
    // position bornée : une erreur en fin de texte pointe juste après
    let colonne = e.position.min(reference.chars().count());
    format!(
        "{reference}\n{}^\n{} : {}",
        " ".repeat(colonne),
        e.genre,
        e.message
    )
}
