// src/noyau/erreur.rs
//
// Erreurs du noyau : enregistrements (genre + position + origine), jamais de panique.
// - Structurelles (validation / découpe / chaîne) : une seule, la compilation s’arrête.
// - Évaluation : collectées dans un journal, la sous-expression vaut NaN.

use std::fmt;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenreErreur {
    ParentheseDesequilibree,
    CaractereIllegal,
    Syntaxe,
    NomIndefini,
    Domaine,
    Depassement,
}

impl GenreErreur {
    /// Erreur détectée avant toute réduction (la structure est invalide).
    pub fn est_structurelle(self) -> bool {
        matches!(
            self,
            GenreErreur::ParentheseDesequilibree
                | GenreErreur::CaractereIllegal
                | GenreErreur::Syntaxe
                | GenreErreur::NomIndefini
        )
    }
}

impl fmt::Display for GenreErreur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenreErreur::ParentheseDesequilibree => "parenthèses déséquilibrées",
            GenreErreur::CaractereIllegal => "caractère illégal",
            GenreErreur::Syntaxe => "erreur de syntaxe",
            GenreErreur::NomIndefini => "nom indéfini",
            GenreErreur::Domaine => "hors domaine",
            GenreErreur::Depassement => "dépassement",
        };
        f.write_str(s)
    }
}

/// D’où vient l’erreur : compilation, passe réelle ou passe complexe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origine {
    Compilation,
    Reel,
    Complexe,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{genre} (position {position}) : {message}")]
pub struct ErreurCalcul {
    pub genre: GenreErreur,
    /// Index (en caractères) dans la chaîne validée.
    pub position: usize,
    pub origine: Origine,
    pub message: String,
}

impl ErreurCalcul {
    pub fn new(
        genre: GenreErreur,
        position: usize,
        origine: Origine,
        message: impl Into<String>,
    ) -> Self {
        Self {
            genre,
            position,
            origine,
            message: message.into(),
        }
    }

    /// Raccourci pour les erreurs de compilation.
    pub fn compilation(genre: GenreErreur, position: usize, message: impl Into<String>) -> Self {
        Self::new(genre, position, Origine::Compilation, message)
    }
}

/// Liste ordonnée d’erreurs rendue par un compile/evaluate raté.
#[derive(Clone, Debug, Default, PartialEq, Eq, Error)]
#[error("{}", resume(.erreurs))]
pub struct Echec {
    pub erreurs: Vec<ErreurCalcul>,
}

fn resume(erreurs: &[ErreurCalcul]) -> String {
    match erreurs {
        [] => "échec sans diagnostic".to_string(),
        [seule] => seule.to_string(),
        [premiere, reste @ ..] => format!("{premiere} (+{} autre(s))", reste.len()),
    }
}

impl Echec {
    pub fn premiere(&self) -> Option<&ErreurCalcul> {
        self.erreurs.first()
    }

    pub fn contient(&self, genre: GenreErreur) -> bool {
        self.erreurs.iter().any(|e| e.genre == genre)
    }
}

impl From<ErreurCalcul> for Echec {
    fn from(e: ErreurCalcul) -> Self {
        Self { erreurs: vec![e] }
    }
}

/* ------------------------ Journal (archive / restauration) ------------------------ */

/// Tampon d’erreurs partagé entre les deux passes (réelle puis complexe).
///
/// La passe réelle peut être archivée avant la passe complexe :
/// - succès complexe : l’archive est jetée ;
/// - échec complexe : l’archive remplace les erreurs complexes.
#[derive(Clone, Debug, Default)]
pub struct JournalErreurs {
    courantes: Vec<ErreurCalcul>,
    archive: Vec<ErreurCalcul>,
}

impl JournalErreurs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enregistrer(&mut self, e: ErreurCalcul) {
        self.courantes.push(e);
    }

    pub fn est_vide(&self) -> bool {
        self.courantes.is_empty()
    }

    pub fn erreurs(&self) -> &[ErreurCalcul] {
        &self.courantes
    }

    /// Met les erreurs courantes de côté (journal courant vidé).
    pub fn archiver(&mut self) {
        self.archive = std::mem::take(&mut self.courantes);
    }

    pub fn jeter_archive(&mut self) {
        self.archive.clear();
    }

    /// Remet l’archive à la place des erreurs courantes.
    pub fn restaurer(&mut self) {
        if !self.archive.is_empty() {
            self.courantes = std::mem::take(&mut self.archive);
        }
    }

    pub fn effacer(&mut self) {
        self.courantes.clear();
        self.archive.clear();
    }

    /// Vide le journal dans un `Echec`.
    pub fn vers_echec(&mut self) -> Echec {
        Echec {
            erreurs: std::mem::take(&mut self.courantes),
        }
    }
}
