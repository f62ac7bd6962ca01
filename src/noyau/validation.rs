// src/noyau/validation.rs
//
// Validateur : première étape, avant toute découpe.
// 1) parenthèses équilibrées
// 2) alphabet légal
// 3) multiplication implicite : "2pi" -> "2*pi", "(1)(2)" -> "(1)*(2)", "x2" -> "x*2"
//
// Entrée déjà sans blancs. La sortie peut être plus longue que l’entrée :
// toutes les positions des étapes suivantes se réfèrent à la chaîne rendue.

use super::erreur::{ErreurCalcul, GenreErreur};
use super::jetons::{est_debut_nom, est_debut_nombre, est_legal, fin_nom, fin_nombre};
use super::registre::Registre;

/// Nature du dernier jeton écrit (pour décider d’insérer '*').
#[derive(Clone, Copy, PartialEq, Eq)]
enum Precedent {
    Rien,
    Nombre,
    /// ')' , '!' ou nom qui n’est pas un appel de fonction
    Valeur,
    Fonction,
}

pub fn valider(texte: &str, registre: &Registre) -> Result<String, ErreurCalcul> {
    let chars: Vec<char> = texte.chars().collect();
    if chars.is_empty() {
        return Err(ErreurCalcul::compilation(
            GenreErreur::Syntaxe,
            0,
            "expression vide",
        ));
    }

    verifier_parentheses(&chars)?;
    verifier_alphabet(&chars)?;
    Ok(inserer_multiplications(&chars, registre))
}

fn verifier_parentheses(chars: &[char]) -> Result<(), ErreurCalcul> {
    let mut ouvertes: Vec<usize> = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' => ouvertes.push(i),
            ')' => {
                if ouvertes.pop().is_none() {
                    return Err(ErreurCalcul::compilation(
                        GenreErreur::ParentheseDesequilibree,
                        i,
                        "parenthèse fermante sans ouvrante",
                    ));
                }
            }
            _ => {}
        }
    }

    // première ouvrante jamais refermée
    match ouvertes.first() {
        Some(&p) => Err(ErreurCalcul::compilation(
            GenreErreur::ParentheseDesequilibree,
            p,
            "parenthèse ouvrante jamais fermée",
        )),
        None => Ok(()),
    }
}

fn verifier_alphabet(chars: &[char]) -> Result<(), ErreurCalcul> {
    match chars.iter().position(|&c| !est_legal(c)) {
        Some(i) => Err(ErreurCalcul::compilation(
            GenreErreur::CaractereIllegal,
            i,
            format!("caractère '{}' interdit", chars[i]),
        )),
        None => Ok(()),
    }
}

fn inserer_multiplications(chars: &[char], registre: &Registre) -> String {
    let n = chars.len();
    let mut out = String::with_capacity(n + n / 2);
    let mut prec = Precedent::Rien;
    let mut i = 0;

    while i < n {
        let c = chars[i];

        if est_debut_nombre(c) {
            // "2.5.3" : deux littéraux collés, on laisse la chaîne rejeter
            if prec == Precedent::Valeur {
                out.push('*');
            }
            let fin = fin_nombre(chars, i);
            out.extend(&chars[i..fin]);
            prec = Precedent::Nombre;
            i = fin;
            continue;
        }

        if est_debut_nom(c) {
            if matches!(prec, Precedent::Nombre | Precedent::Valeur) {
                out.push('*');
            }
            let fin = fin_nom(chars, i);
            let nom: String = chars[i..fin].iter().collect();
            let appel = fin < n && chars[fin] == '(' && registre.est_fonction(&nom);
            out.push_str(&nom);
            prec = if appel {
                Precedent::Fonction
            } else {
                Precedent::Valeur
            };
            i = fin;
            continue;
        }

        match c {
            '(' => {
                if matches!(prec, Precedent::Nombre | Precedent::Valeur) {
                    out.push('*');
                }
                prec = Precedent::Rien;
            }
            ')' | '!' => prec = Precedent::Valeur,
            _ => prec = Precedent::Rien,
        }
        out.push(c);
        i += 1;
    }

    out
}
