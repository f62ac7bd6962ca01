//! Noyau de calcul scientifique (réel + complexe)
//!
//! Organisation interne :
//! - jetons.rs     : alphabet, opérateurs, lecture des nombres et des noms
//! - validation.rs : parenthèses, caractères, multiplication implicite
//! - decoupe.rs    : sous-expressions (profondeur, arguments, parents)
//! - chaine.rs     : chaînes de noeuds, résolution des noms, fonctions utilisateur
//! - expr.rs       : ExprCompilee (tables indexées, inconnues, duplicate)
//! - reduction.rs  : réduction générique par priorité
//! - domaine.rs    : f64 / Complex64 derrière le trait Scalaire
//! - eval.rs       : compile / evaluate / solve_once (repli complexe)
//! - registre.rs   : constantes, ans, variables, fonctions utilisateur
//! - fonctions.rs  : table des fonctions internes
//! - erreur.rs     : genres d’erreurs, journal avec archive
//! - trace.rs      : balayage d’une fonction
//! - analyse.rs    : dérivée et intégrale numériques
//! - format.rs     : %.Ng, a+bi, fractions

pub mod analyse;
mod chaine;
mod decoupe;
pub mod domaine;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod fonctions;
pub mod format;
pub mod jetons;
mod reduction;
pub mod registre;
pub mod trace;
pub mod validation;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

#[cfg(test)]
mod tests_proprietes;

// API publique minimale
pub use domaine::{Domaine, Scalaire};
pub use erreur::{Echec, ErreurCalcul, GenreErreur, JournalErreurs, Origine};
pub use eval::{compile, solve_once};
pub use expr::{ExprCompilee, Terme};
pub use registre::{ErreurRegistre, Registre, Resolution, ANS};
