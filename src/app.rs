// src/app.rs
//
// Calculatrice — module App (racine)
// ----------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs)
// - Ré-exporter Session / Reglages / Sortie (pour main.rs: use calculatrice_sci::app::Session;)
//
// Le noyau ne sait rien de l’affichage : tout le texte destiné à l’utilisateur
// est produit par vue.rs.

pub mod etat;
pub mod vue;

pub use etat::{
    ErreurSession, Reglages, Session, Sortie, CHIFFRES_DEFAUT, CHIFFRES_MAX, POINTS_MAX, VARIABLE,
};
