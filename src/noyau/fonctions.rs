// src/noyau/fonctions.rs
//
// Table des fonctions internes (unaires).
// Le calcul lui-même vit dans domaine.rs (une implémentation par domaine).

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Interne {
    Abs,
    Ceil,
    Floor,
    Round,
    Sign,
    Sqrt,
    Cbrt,
    Exp,
    Ln,
    Log,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Fact,
    Arg,
    Re,
    Im,
    Conj,
}

const TABLE: &[(&str, Interne)] = &[
    ("abs", Interne::Abs),
    ("ceil", Interne::Ceil),
    ("floor", Interne::Floor),
    ("round", Interne::Round),
    ("sign", Interne::Sign),
    ("sqrt", Interne::Sqrt),
    ("cbrt", Interne::Cbrt),
    ("exp", Interne::Exp),
    ("ln", Interne::Ln),
    ("log", Interne::Log),
    ("sin", Interne::Sin),
    ("cos", Interne::Cos),
    ("tan", Interne::Tan),
    ("asin", Interne::Asin),
    ("acos", Interne::Acos),
    ("atan", Interne::Atan),
    ("sinh", Interne::Sinh),
    ("cosh", Interne::Cosh),
    ("tanh", Interne::Tanh),
    ("asinh", Interne::Asinh),
    ("acosh", Interne::Acosh),
    ("atanh", Interne::Atanh),
    ("fact", Interne::Fact),
    ("arg", Interne::Arg),
    ("re", Interne::Re),
    ("im", Interne::Im),
    ("conj", Interne::Conj),
];

impl Interne {
    pub fn depuis_nom(nom: &str) -> Option<Self> {
        TABLE.iter().find(|(n, _)| *n == nom).map(|(_, f)| *f)
    }

    pub fn nom(self) -> &'static str {
        TABLE
            .iter()
            .find(|(_, f)| *f == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    /// Fonctions sans sens hors des réels (arrondis, factorielle, signe).
    pub fn reel_seulement(self) -> bool {
        matches!(
            self,
            Interne::Ceil | Interne::Floor | Interne::Round | Interne::Sign | Interne::Fact
        )
    }

    /// Un résultat infini vient d’une singularité (ln 0), pas d’un dépassement.
    pub fn singuliere(self) -> bool {
        matches!(self, Interne::Ln | Interne::Log | Interne::Atanh)
    }

    /// Noms de toutes les fonctions internes (ordre de la table).
    pub fn noms() -> impl Iterator<Item = &'static str> {
        TABLE.iter().map(|(n, _)| *n)
    }
}

/// Factorielle réelle : entier naturel seulement.
/// Au-delà de 170! le résultat n’est plus représentable (infini).
pub fn factorielle_reelle(x: f64) -> Option<f64> {
    if !x.is_finite() || x < 0.0 || x.fract() != 0.0 {
        return None;
    }
    if x > 170.0 {
        return Some(f64::INFINITY);
    }
    let n = x as u32;
    Some((2..=n).fold(1.0, |acc, k| acc * f64::from(k)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aller_retour_des_noms() {
        for nom in Interne::noms() {
            let f = Interne::depuis_nom(nom).unwrap();
            assert_eq!(f.nom(), nom);
        }
        assert_eq!(Interne::depuis_nom("pi"), None);
        assert_eq!(Interne::depuis_nom("Sin"), None);
    }

    #[test]
    fn factorielles() {
        assert_eq!(factorielle_reelle(0.0), Some(1.0));
        assert_eq!(factorielle_reelle(5.0), Some(120.0));
        assert_eq!(factorielle_reelle(2.5), None);
        assert_eq!(factorielle_reelle(-1.0), None);
        assert_eq!(factorielle_reelle(171.0), Some(f64::INFINITY));
    }
}
