// src/noyau/decoupe.rs
//
// Décomposeur : chaîne validée -> squelette des sous-expressions.
//
// Chaque paire de parenthèses donne une sous-expression, ou plusieurs si elle
// contient des virgules de premier niveau (un argument = une sous-expression,
// la dernière portant l’appel). La chaîne entière est la dernière.
//
// Ordre : profondeur décroissante, puis position d’ouverture croissante.
// Un enfant est donc toujours rangé avant ce qui lit son résultat.

use std::collections::HashMap;

use super::erreur::{ErreurCalcul, GenreErreur};
use super::expr::SousExpr;
use super::jetons::est_debut_nom;
use super::registre::Registre;

/// Ce que le constructeur doit savoir d’une parenthèse ouvrante.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PaireDecoupee {
    /// Sous-expression qui représente toute la paire (porte l’appel éventuel).
    pub principale: usize,
    pub fermante: usize,
}

/// Appel encore non résolu (le constructeur compile les fonctions utilisateur).
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AppelBrut {
    pub sous: usize,
    pub nom: String,
    pub position: usize,
    pub arguments: Vec<usize>,
}

#[derive(Debug)]
pub(crate) struct Decoupage {
    pub sous: Vec<SousExpr>,
    /// Clé : index de la parenthèse ouvrante.
    pub paires: HashMap<usize, PaireDecoupee>,
    pub appels: Vec<AppelBrut>,
}

#[derive(Debug)]
struct Paire {
    ouvrante: usize,
    fermante: usize,
    profondeur: usize,
    englobante: Option<usize>,
    virgules: Vec<usize>,
}

fn syntaxe(position: usize, message: impl Into<String>) -> ErreurCalcul {
    ErreurCalcul::compilation(GenreErreur::Syntaxe, position, message)
}

pub(crate) fn decouper(chars: &[char], registre: &Registre) -> Result<Decoupage, ErreurCalcul> {
    let paires = relever_paires(chars)?;

    // ordre de traitement
    let mut ordre: Vec<usize> = (0..paires.len()).collect();
    ordre.sort_by_key(|&k| (std::cmp::Reverse(paires[k].profondeur), paires[k].ouvrante));

    let mut sous: Vec<SousExpr> = Vec::new();
    // pour chaque paire : (debut, fin, id) de ses segments
    let mut segments: Vec<Vec<(usize, usize, usize)>> = vec![Vec::new(); paires.len()];
    let mut index = HashMap::with_capacity(paires.len());
    let mut appels = Vec::new();

    for &k in &ordre {
        let p = &paires[k];
        if p.fermante == p.ouvrante + 1 {
            return Err(syntaxe(p.ouvrante, "parenthèses vides"));
        }

        let nom_debut = debut_du_nom(chars, p.ouvrante);
        let nom: String = chars[nom_debut..p.ouvrante].iter().collect();

        if nom.is_empty() {
            if let Some(&v) = p.virgules.first() {
                return Err(syntaxe(v, "virgule hors d’un appel de fonction"));
            }
        } else if !registre.est_fonction(&nom) {
            return Err(ErreurCalcul::compilation(
                GenreErreur::NomIndefini,
                nom_debut,
                format!("'{nom}' n’est pas une fonction"),
            ));
        }

        // segments séparés par les virgules de premier niveau
        let mut bornes = Vec::with_capacity(p.virgules.len() + 2);
        bornes.push(p.ouvrante);
        bornes.extend(&p.virgules);
        bornes.push(p.fermante);

        for w in bornes.windows(2) {
            let (debut, fin) = (w[0] + 1, w[1]);
            if debut == fin {
                return Err(syntaxe(w[0], "argument vide"));
            }
            let id = sous.len();
            sous.push(SousExpr::vide(debut, fin, p.profondeur));
            segments[k].push((debut, fin, id));
        }

        let ids: Vec<usize> = segments[k].iter().map(|&(_, _, id)| id).collect();
        let principale = ids[ids.len() - 1];
        // les arguments sont lus par l’appel porté par la principale
        for &a in &ids[..ids.len() - 1] {
            sous[a].parent = Some(principale);
        }

        index.insert(
            p.ouvrante,
            PaireDecoupee {
                principale,
                fermante: p.fermante,
            },
        );

        if !nom.is_empty() {
            appels.push(AppelBrut {
                sous: principale,
                nom,
                position: nom_debut,
                arguments: ids[..ids.len() - 1].to_vec(),
            });
        }
    }

    // la chaîne entière, en dernier
    let racine = sous.len();
    let mut derniere = SousExpr::vide(0, chars.len(), 0);
    derniere.derniere = true;
    sous.push(derniere);

    // parent de chaque principale = segment qui contient son ouverture
    for (k, p) in paires.iter().enumerate() {
        let Some(&PaireDecoupee { principale, .. }) = index.get(&p.ouvrante) else {
            continue;
        };
        let parent = match p.englobante {
            Some(e) => segments[e]
                .iter()
                .find(|&&(debut, fin, _)| debut <= p.ouvrante && p.ouvrante < fin)
                .map(|&(_, _, id)| id)
                .unwrap_or(racine),
            None => racine,
        };
        debug_assert!(segments[k].iter().all(|&(_, _, id)| id < parent));
        sous[principale].parent = Some(parent);
    }

    Ok(Decoupage {
        sous,
        paires: index,
        appels,
    })
}

/// Relève les paires (déjà équilibrées) et les virgules de premier niveau.
fn relever_paires(chars: &[char]) -> Result<Vec<Paire>, ErreurCalcul> {
    let mut paires: Vec<Paire> = Vec::new();
    let mut pile: Vec<usize> = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' => {
                paires.push(Paire {
                    ouvrante: i,
                    fermante: i,
                    profondeur: pile.len() + 1,
                    englobante: pile.last().copied(),
                    virgules: Vec::new(),
                });
                pile.push(paires.len() - 1);
            }
            ')' => {
                let k = pile.pop().ok_or_else(|| {
                    ErreurCalcul::compilation(
                        GenreErreur::ParentheseDesequilibree,
                        i,
                        "parenthèse fermante sans ouvrante",
                    )
                })?;
                paires[k].fermante = i;
            }
            ',' => match pile.last() {
                Some(&k) => paires[k].virgules.push(i),
                None => return Err(syntaxe(i, "virgule hors d’un appel de fonction")),
            },
            _ => {}
        }
    }

    if let Some(&k) = pile.first() {
        return Err(ErreurCalcul::compilation(
            GenreErreur::ParentheseDesequilibree,
            paires[k].ouvrante,
            "parenthèse ouvrante jamais fermée",
        ));
    }
    Ok(paires)
}

/// Début du nom collé juste avant `ouvrante` (== ouvrante si aucun).
fn debut_du_nom(chars: &[char], ouvrante: usize) -> usize {
    let mut d = ouvrante;
    while d > 0 && est_debut_nom(chars[d - 1]) {
        d -= 1;
    }
    d
}
