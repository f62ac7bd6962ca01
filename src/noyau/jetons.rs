// src/noyau/jetons.rs
//
// Lexique commun au validateur et au constructeur de chaînes.
// - nombres : chiffres + '.' + exposant optionnel (2e3, 1.5e-2)
// - noms    : [a-zA-Z_]+ (un chiffre après un nom = multiplication implicite)
// - opérateurs binaires : + - * / ^ %
// - postfixe : !
// - séparateur d’arguments : ,

/// Opérateur binaire d’un noeud de réduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operateur {
    Plus,
    Moins,
    Fois,
    Divise,
    Modulo,
    Puissance,
}

impl Operateur {
    pub fn depuis_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operateur::Plus),
            '-' => Some(Operateur::Moins),
            '*' => Some(Operateur::Fois),
            '/' => Some(Operateur::Divise),
            '%' => Some(Operateur::Modulo),
            '^' => Some(Operateur::Puissance),
            _ => None,
        }
    }

    pub fn symbole(self) -> char {
        match self {
            Operateur::Plus => '+',
            Operateur::Moins => '-',
            Operateur::Fois => '*',
            Operateur::Divise => '/',
            Operateur::Modulo => '%',
            Operateur::Puissance => '^',
        }
    }

    /// Priorité : plus grand = réduit d’abord.
    pub fn priorite(self) -> u8 {
        match self {
            Operateur::Plus | Operateur::Moins => 1,
            Operateur::Fois | Operateur::Divise | Operateur::Modulo => 2,
            Operateur::Puissance => 3,
        }
    }
}

pub fn est_operateur(c: char) -> bool {
    Operateur::depuis_char(c).is_some()
}

pub fn est_debut_nom(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn est_debut_nombre(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Alphabet légal (après retrait des blancs).
pub fn est_legal(c: char) -> bool {
    est_debut_nombre(c) || est_debut_nom(c) || est_operateur(c) || matches!(c, '(' | ')' | '!' | ',')
}

/// Fin (exclue) du nom qui commence en `i`.
pub fn fin_nom(chars: &[char], i: usize) -> usize {
    let mut j = i;
    while j < chars.len() && est_debut_nom(chars[j]) {
        j += 1;
    }
    j
}

/// Fin (exclue) du littéral numérique qui commence en `i`.
///
/// Un seul point décimal ; l’exposant n’est pris que s’il est suivi d’un chiffre
/// (éventuellement signé) : "2e3" est un nombre, "2e" est 2 puis le nom e.
pub fn fin_nombre(chars: &[char], i: usize) -> usize {
    let mut j = i;
    let mut point = false;
    while j < chars.len() {
        match chars[j] {
            c if c.is_ascii_digit() => j += 1,
            '.' if !point => {
                point = true;
                j += 1;
            }
            _ => break,
        }
    }

    if j < chars.len() && matches!(chars[j], 'e' | 'E') && j > i {
        let mut k = j + 1;
        if k < chars.len() && matches!(chars[k], '+' | '-') {
            k += 1;
        }
        if k < chars.len() && chars[k].is_ascii_digit() {
            while k < chars.len() && chars[k].is_ascii_digit() {
                k += 1;
            }
            return k;
        }
    }
    j
}

/// Lit le littéral [i, fin). `None` si ce n’est pas un nombre (ex: "." seul).
pub fn lire_nombre(chars: &[char], i: usize) -> Option<(f64, usize)> {
    let fin = fin_nombre(chars, i);
    if fin == i {
        return None;
    }
    let texte: String = chars[i..fin].iter().collect();
    texte.parse::<f64>().ok().map(|v| (v, fin))
}

/// Retire les blancs (l’entrée utilisateur peut en contenir pour la lisibilité).
pub fn retirer_blancs(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
