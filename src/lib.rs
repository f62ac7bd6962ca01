// src/lib.rs
//
// Calculatrice scientifique — bibliothèque
// - noyau : compilation + évaluation (réel, repli complexe)
// - app   : session (ans, variables, fonctions) + rendu texte

pub mod app;
pub mod noyau;

pub use noyau::{compile, solve_once, Echec, ErreurCalcul, ExprCompilee, GenreErreur, Registre};
