// src/noyau/chaine.rs
//
// Constructeur : remplit chaque sous-expression du squelette avec sa chaîne
// de noeuds. Un opérande = nombre | nom | (sous-expression) | nom(...),
// précédé de signes unaires (repliés) et suivi de '!' éventuels.
//
// Les noms sont résolus ici : inconnue déclarée, puis registre.
// Les fonctions utilisateur sont compilées au site d’appel (paramètres =
// inconnues du corps) ; la pile des noms en cours d’expansion refuse la récursion.

use std::collections::HashMap;

use num_complex::Complex64;

use super::decoupe::{AppelBrut, Decoupage, PaireDecoupee};
use super::erreur::{ErreurCalcul, GenreErreur};
use super::eval::compiler_dans;
use super::expr::{
    Appel, ExprCompilee, Fonction, Inconnue, Noeud, Occurrence, Operande, SousExpr, Terme,
};
use super::jetons::{est_debut_nom, est_debut_nombre, fin_nom, lire_nombre, Operateur};
use super::registre::{Registre, Resolution};

fn syntaxe(position: usize, message: impl Into<String>) -> ErreurCalcul {
    ErreurCalcul::compilation(GenreErreur::Syntaxe, position, message)
}

struct Constructeur<'a> {
    chars: &'a [char],
    registre: &'a Registre,
    paires: &'a HashMap<usize, PaireDecoupee>,
    inconnues: Vec<Inconnue>,
    imaginaire: bool,
    reel_seulement: bool,
}

pub(crate) fn construire(
    source: String,
    chars: &[char],
    decoupage: Decoupage,
    registre: &Registre,
    noms_inconnues: &[&str],
    pile: &[String],
) -> Result<ExprCompilee, ErreurCalcul> {
    let Decoupage {
        mut sous,
        paires,
        appels,
    } = decoupage;

    let mut inconnues: Vec<Inconnue> = Vec::with_capacity(noms_inconnues.len());
    for &nom in noms_inconnues {
        if !inconnues.iter().any(|u| u.nom == nom) {
            inconnues.push(Inconnue {
                nom: nom.to_string(),
                valeur: Complex64::new(0.0, 0.0),
                occurrences: Vec::new(),
            });
        }
    }

    let mut c = Constructeur {
        chars,
        registre,
        paires: &paires,
        inconnues,
        imaginaire: false,
        reel_seulement: false,
    };

    for (id, s) in sous.iter_mut().enumerate() {
        c.remplir(id, s)?;
    }

    for brut in appels {
        let sous_id = brut.sous;
        let appel = c.resoudre_appel(brut, pile)?;
        sous[sous_id].appel = Some(appel);
    }

    let Constructeur {
        inconnues,
        imaginaire,
        reel_seulement,
        ..
    } = c;
    let mut expr = ExprCompilee::new(source, sous, inconnues);
    expr.imaginaire = imaginaire;
    expr.reel_seulement = reel_seulement;
    Ok(expr)
}

impl<'a> Constructeur<'a> {
    /* ------------------------ Chaîne d’une sous-expression ------------------------ */

    fn remplir(&mut self, id: usize, s: &mut SousExpr) -> Result<(), ErreurCalcul> {
        let (debut, fin) = (s.debut, s.fin);
        let chars = self.chars;

        let mut operandes: Vec<Operande> = Vec::new();
        let mut operateurs: Vec<(Operateur, usize)> = Vec::new();
        let mut attend_operande = true;
        let mut negatif = false;
        let mut i = debut;

        while i < fin {
            let c = chars[i];

            if attend_operande {
                // signes unaires : repliés dans l’opérande qui suit
                if c == '+' || c == '-' {
                    negatif ^= c == '-';
                    i += 1;
                    continue;
                }
                if Operateur::depuis_char(c).is_some() || matches!(c, ')' | ',' | '!') {
                    return Err(syntaxe(i, format!("opérande manquant avant '{c}'")));
                }

                let (terme, suivant) = self.lire_terme(id, i)?;
                let mut op = Operande::new(terme, i);
                op.negatif = negatif;
                negatif = false;
                i = suivant;

                while i < fin && chars[i] == '!' {
                    op.factorielles = op.factorielles.saturating_add(1);
                    self.reel_seulement = true;
                    i += 1;
                }

                operandes.push(op);
                attend_operande = false;
            } else {
                match Operateur::depuis_char(c) {
                    Some(o) => {
                        if o == Operateur::Modulo {
                            self.reel_seulement = true;
                        }
                        operateurs.push((o, i));
                        attend_operande = true;
                        i += 1;
                    }
                    None => return Err(syntaxe(i, "opérateur attendu")),
                }
            }
        }

        if attend_operande {
            return Err(match operateurs.last() {
                Some(&(o, pos)) => syntaxe(
                    pos,
                    format!("l’expression se termine par '{}'", o.symbole()),
                ),
                None => syntaxe(fin.saturating_sub(1).max(debut), "opérande manquant"),
            });
        }

        if operateurs.is_empty() {
            s.seul = operandes.first().copied();
            return Ok(());
        }

        s.noeuds = operateurs
            .iter()
            .enumerate()
            .map(|(k, &(operateur, position))| Noeud {
                operateur,
                priorite: operateur.priorite(),
                position,
                gauche: operandes[k],
                droite: operandes[k + 1],
            })
            .collect();
        Ok(())
    }

    /// Lit un terme à partir de `i` ; rend le terme et l’index qui suit.
    fn lire_terme(&mut self, id: usize, i: usize) -> Result<(Terme, usize), ErreurCalcul> {
        let chars = self.chars;
        let c = chars[i];

        if est_debut_nombre(c) {
            return match lire_nombre(chars, i) {
                Some((v, fin)) => Ok((Terme::Nombre(Complex64::from(v)), fin)),
                None => Err(syntaxe(i, "nombre mal formé")),
            };
        }

        if c == '(' {
            return self.sauter_paire(i);
        }

        if est_debut_nom(c) {
            let fin = fin_nom(chars, i);
            if fin < chars.len() && chars[fin] == '(' {
                // nom(...) : l’appel est attaché à la sous-expression de la paire
                return self.sauter_paire(fin);
            }
            let nom: String = chars[i..fin].iter().collect();
            return Ok((self.resoudre_nom(&nom, id, i)?, fin));
        }

        Err(syntaxe(i, format!("caractère '{c}' inattendu")))
    }

    fn sauter_paire(&self, ouvrante: usize) -> Result<(Terme, usize), ErreurCalcul> {
        match self.paires.get(&ouvrante) {
            Some(p) => Ok((Terme::Sous(p.principale), p.fermante + 1)),
            None => Err(syntaxe(ouvrante, "parenthèse inattendue")),
        }
    }

    fn resoudre_nom(&mut self, nom: &str, id: usize, position: usize) -> Result<Terme, ErreurCalcul> {
        if let Some(k) = self.inconnues.iter().position(|u| u.nom == nom) {
            self.inconnues[k]
                .occurrences
                .push(Occurrence { sous: id, position });
            return Ok(Terme::Inconnue(k));
        }

        match self.registre.resolve_name(nom) {
            Resolution::Constante(v) | Resolution::Variable(v) => {
                if v.im != 0.0 {
                    self.imaginaire = true;
                }
                Ok(Terme::Nombre(v))
            }
            Resolution::Interne(_) | Resolution::FonctionUtilisateur(_) => Err(syntaxe(
                position,
                format!("'{nom}' est une fonction : parenthèses attendues"),
            )),
            Resolution::Introuvable => Err(ErreurCalcul::compilation(
                GenreErreur::NomIndefini,
                position,
                format!("'{nom}' n’est pas défini"),
            )),
        }
    }

    /* ------------------------ Appels ------------------------ */

    fn resoudre_appel(&mut self, brut: AppelBrut, pile: &[String]) -> Result<Appel, ErreurCalcul> {
        let AppelBrut {
            nom,
            position,
            arguments,
            ..
        } = brut;

        let fonction = match self.registre.resolve_name(&nom) {
            Resolution::Interne(f) => {
                if !arguments.is_empty() {
                    return Err(syntaxe(
                        position,
                        format!("'{nom}' attend un seul argument"),
                    ));
                }
                Fonction::Interne(f)
            }
            Resolution::FonctionUtilisateur(fu) => {
                if pile.iter().any(|p| *p == nom) {
                    return Err(syntaxe(position, format!("définition récursive de '{nom}'")));
                }
                if fu.parametres.len() != arguments.len() + 1 {
                    return Err(syntaxe(
                        position,
                        format!(
                            "'{nom}' attend {} argument(s), {} donné(s)",
                            fu.parametres.len(),
                            arguments.len() + 1
                        ),
                    ));
                }

                let params: Vec<&str> = fu.parametres.iter().map(String::as_str).collect();
                let mut pile_appel = pile.to_vec();
                pile_appel.push(nom.clone());

                let corps = compiler_dans(&fu.corps, self.registre, &params, &pile_appel)
                    .map_err(|e| {
                        ErreurCalcul::compilation(
                            e.genre,
                            position,
                            format!("dans '{nom}' : {}", e.message),
                        )
                    })?;

                self.imaginaire |= corps.imaginaire;
                self.reel_seulement |= corps.reel_seulement;
                Fonction::Utilisateur {
                    nom: nom.clone(),
                    corps: Box::new(corps),
                }
            }
            _ => {
                return Err(ErreurCalcul::compilation(
                    GenreErreur::NomIndefini,
                    position,
                    format!("'{nom}' n’est pas une fonction"),
                ))
            }
        };

        Ok(Appel {
            fonction,
            position,
            arguments,
        })
    }
}
