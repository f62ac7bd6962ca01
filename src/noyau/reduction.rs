// src/noyau/reduction.rs
//
// Réducteur : évalue une ExprCompilee dans un domaine (f64 ou Complex64).
//
// Pour chaque sous-expression, dans l’ordre (la plus profonde d’abord) :
// - copie de travail de la chaîne de noeuds (maillons chaînés par indices) ;
// - tant qu’il reste des maillons : le premier de plus haute priorité est
//   calculé, son résultat est écrit chez le voisin qui le consomme, puis
//   il est délié ;
// - la fonction éventuelle est appliquée au résultat ;
// - la valeur est rangée dans `valeurs[id]`, lue par le parent via Terme::Sous.
//
// Règle d’écriture : vers la droite du précédent si sa priorité est >= à celle
// du suivant, sinon vers la gauche du suivant. Égalité => le précédent gagne,
// donc gauche à droite pour + - * / % et aussi pour ^ (2^3^2 = 64).
//
// Une erreur n’arrête pas la sous-expression : elle est journalisée, le noeud
// vaut NaN et la réduction continue (NaN se propage sans nouvelle erreur).

use tracing::trace;

use super::domaine::{Domaine, Scalaire};
use super::erreur::{ErreurCalcul, GenreErreur, JournalErreurs, Origine};
use super::expr::{Appel, ExprCompilee, Fonction, Inconnue, Noeud, Operande, Terme};
use super::jetons::Operateur;

/// Copie de travail d’un noeud.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Maillon<T> {
    gauche: T,
    droite: T,
    /// `-a^b` : le signe de la base s’applique après la puissance.
    base_negative: bool,
    precedent: Option<usize>,
    suivant: Option<usize>,
}

/// Espace de travail réutilisé d’une évaluation à l’autre.
#[derive(Clone, Debug)]
pub struct Chantier<T> {
    valeurs: Vec<T>,
    operandes: Vec<T>,
    maillons: Vec<Maillon<T>>,
}

impl<T> Chantier<T> {
    pub(crate) fn new(nb_sous: usize) -> Self {
        Self {
            valeurs: Vec::with_capacity(nb_sous),
            operandes: Vec::new(),
            maillons: Vec::new(),
        }
    }
}

fn origine<T: Scalaire>() -> Origine {
    match T::DOMAINE {
        Domaine::Reel => Origine::Reel,
        Domaine::Complexe => Origine::Complexe,
    }
}

fn noter<T: Scalaire>(
    journal: &mut JournalErreurs,
    genre: GenreErreur,
    position: usize,
    message: impl Into<String>,
) {
    journal.enregistrer(ErreurCalcul::new(genre, position, origine::<T>(), message));
}

/// Réduit toute l’expression ; NaN si au moins une erreur a été journalisée.
pub(crate) fn reduire<T: Scalaire>(expr: &mut ExprCompilee, journal: &mut JournalErreurs) -> T {
    let ExprCompilee {
        sous,
        inconnues,
        reel,
        complexe,
        ..
    } = expr;
    let chantier = T::chantier(reel, complexe);
    let domaine = T::DOMAINE;

    chantier.valeurs.clear();
    chantier.valeurs.resize(sous.len(), T::nan());

    for id in 0..sous.len() {
        let s = &sous[id];
        let mut v = match &s.seul {
            Some(op) => {
                let brut = charger(op, inconnues, &chantier.valeurs, journal);
                signer(brut, op.negatif)
            }
            None => reduire_chaine(
                &s.noeuds,
                inconnues,
                &chantier.valeurs,
                &mut chantier.operandes,
                &mut chantier.maillons,
                journal,
            ),
        };

        if let Some(appel) = sous[id].appel.as_mut() {
            v = appeler(appel, v, &chantier.valeurs, journal);
        }

        trace!(%domaine, sous = id, valeur = ?v, "sous-expression réduite");
        chantier.valeurs[id] = v;
    }

    chantier.valeurs.last().copied().unwrap_or_else(T::nan)
}

/// 0 - v plutôt que -v : pas de zéro négatif en partie imaginaire
/// (sqrt(-4) doit rester 2i, pas -2i).
fn signer<T: Scalaire>(v: T, negatif: bool) -> T {
    if negatif {
        T::zero() - v
    } else {
        v
    }
}

/* ------------------------ Opérandes ------------------------ */

/// Valeur absolue d’un opérande (factorielles appliquées, signe non appliqué).
fn charger<T: Scalaire>(
    op: &Operande,
    inconnues: &[Inconnue],
    valeurs: &[T],
    journal: &mut JournalErreurs,
) -> T {
    let brut = match op.terme {
        Terme::Nombre(c) => match T::depuis_complexe(c) {
            Some(v) => v,
            None => {
                noter::<T>(
                    journal,
                    GenreErreur::Syntaxe,
                    op.position,
                    "nombre imaginaire hors du mode complexe",
                );
                return T::nan();
            }
        },
        Terme::Inconnue(k) => match T::depuis_complexe(inconnues[k].valeur) {
            Some(v) if v.est_nan() => {
                noter::<T>(
                    journal,
                    GenreErreur::Domaine,
                    op.position,
                    format!("valeur indéfinie pour '{}'", inconnues[k].nom),
                );
                return T::nan();
            }
            Some(v) => v,
            None => {
                noter::<T>(
                    journal,
                    GenreErreur::Domaine,
                    op.position,
                    format!("valeur complexe de '{}' en mode réel", inconnues[k].nom),
                );
                return T::nan();
            }
        },
        Terme::Sous(id) => valeurs[id],
    };

    if brut.est_infini() {
        noter::<T>(journal, GenreErreur::Depassement, op.position, "nombre trop grand");
        return T::nan();
    }

    let mut v = brut;
    for _ in 0..op.factorielles {
        if v.est_nan() {
            break;
        }
        v = match v.factorielle() {
            Ok(f) if f.est_infini() => {
                noter::<T>(journal, GenreErreur::Depassement, op.position, "factorielle trop grande");
                return T::nan();
            }
            Ok(f) => f,
            Err(m) => {
                noter::<T>(journal, GenreErreur::Domaine, op.position, m);
                return T::nan();
            }
        };
    }
    v
}

/* ------------------------ Chaîne ------------------------ */

fn reduire_chaine<T: Scalaire>(
    noeuds: &[Noeud],
    inconnues: &[Inconnue],
    valeurs: &[T],
    operandes: &mut Vec<T>,
    maillons: &mut Vec<Maillon<T>>,
    journal: &mut JournalErreurs,
) -> T {
    let n = noeuds.len();
    if n == 0 {
        return T::nan();
    }

    // chaque opérande partagé n’est chargé qu’une fois
    operandes.clear();
    operandes.push(charger(&noeuds[0].gauche, inconnues, valeurs, journal));
    for nd in noeuds {
        operandes.push(charger(&nd.droite, inconnues, valeurs, journal));
    }

    maillons.clear();
    for (k, nd) in noeuds.iter().enumerate() {
        let base_negative = nd.gauche.negatif && nd.operateur == Operateur::Puissance;
        maillons.push(Maillon {
            gauche: signer(operandes[k], nd.gauche.negatif && !base_negative),
            droite: signer(operandes[k + 1], nd.droite.negatif),
            base_negative,
            precedent: k.checked_sub(1),
            suivant: (k + 1 < n).then_some(k + 1),
        });
    }

    let mut tete = 0;
    let mut restants = n;
    let mut echec = false;

    loop {
        // premier maillon de plus haute priorité
        let mut choisi = tete;
        let mut k = tete;
        while let Some(j) = maillons[k].suivant {
            if noeuds[j].priorite > noeuds[choisi].priorite {
                choisi = j;
            }
            k = j;
        }

        let m = maillons[choisi];
        let nd = &noeuds[choisi];

        let vers_suivant = match (m.precedent, m.suivant) {
            (Some(p), Some(s)) => noeuds[p].priorite < noeuds[s].priorite,
            (None, Some(_)) => true,
            _ => false,
        };
        // -a^b^c : le signe suit toute la chaîne de puissances
        let porte = m.base_negative
            && vers_suivant
            && m.suivant.is_some_and(|s| noeuds[s].operateur == Operateur::Puissance);

        let r = match calculer(nd.operateur, m.gauche, m.droite, m.base_negative && !porte) {
            Ok(v) => v,
            Err((genre, message)) => {
                noter::<T>(journal, genre, nd.position, message);
                echec = true;
                T::nan()
            }
        };

        restants -= 1;

        match (m.precedent, m.suivant) {
            (_, Some(s)) if vers_suivant => {
                maillons[s].gauche = r;
                maillons[s].base_negative = porte;
            }
            (Some(p), _) => maillons[p].droite = r,
            _ => {}
        }

        if restants == 0 {
            return if echec { T::nan() } else { r };
        }

        // délier
        match m.precedent {
            Some(p) => maillons[p].suivant = m.suivant,
            None => {
                if let Some(s) = m.suivant {
                    tete = s;
                }
            }
        }
        if let Some(s) = m.suivant {
            maillons[s].precedent = m.precedent;
        }
    }
}

/// Un noeud. NaN en entrée => NaN en sortie, sans nouvelle erreur.
fn calculer<T: Scalaire>(
    op: Operateur,
    a: T,
    b: T,
    base_negative: bool,
) -> Result<T, (GenreErreur, &'static str)> {
    if a.est_nan() || b.est_nan() {
        return Ok(T::nan());
    }

    let r = match op {
        Operateur::Plus => a + b,
        Operateur::Moins => a - b,
        Operateur::Fois => a * b,
        Operateur::Divise => {
            if b.is_zero() {
                return Err((GenreErreur::Domaine, "division par zéro"));
            }
            a / b
        }
        Operateur::Modulo => a.modulo(b).map_err(|m| (GenreErreur::Domaine, m))?,
        Operateur::Puissance => signer(
            a.puissance(b).map_err(|m| (GenreErreur::Domaine, m))?,
            base_negative,
        ),
    };

    if r.est_nan() {
        Err((GenreErreur::Domaine, "résultat hors du domaine"))
    } else if r.est_infini() {
        Err((GenreErreur::Depassement, "dépassement de capacité"))
    } else {
        Ok(r)
    }
}

/* ------------------------ Fonctions ------------------------ */

fn appeler<T: Scalaire>(
    appel: &mut Appel,
    v: T,
    valeurs: &[T],
    journal: &mut JournalErreurs,
) -> T {
    let Appel {
        fonction,
        position,
        arguments,
    } = appel;
    let position = *position;

    if v.est_nan() || arguments.iter().any(|&a| valeurs[a].est_nan()) {
        return T::nan();
    }

    match fonction {
        Fonction::Interne(f) => {
            let f = *f;
            match v.appliquer(f) {
                Ok(r) if r.est_nan() => {
                    noter::<T>(
                        journal,
                        GenreErreur::Domaine,
                        position,
                        format!("argument hors du domaine de {}", f.nom()),
                    );
                    T::nan()
                }
                Ok(r) if r.est_infini() => {
                    if f.singuliere() {
                        noter::<T>(
                            journal,
                            GenreErreur::Domaine,
                            position,
                            format!("singularité de {}", f.nom()),
                        );
                    } else {
                        noter::<T>(
                            journal,
                            GenreErreur::Depassement,
                            position,
                            format!("dépassement dans {}", f.nom()),
                        );
                    }
                    T::nan()
                }
                Ok(r) => r,
                Err(m) => {
                    noter::<T>(journal, GenreErreur::Domaine, position, m);
                    T::nan()
                }
            }
        }
        Fonction::Utilisateur { nom, corps } => {
            // paramètres dans l’ordre : arguments précédents, puis v
            let valeurs_args = arguments
                .iter()
                .map(|&a| valeurs[a].en_complexe())
                .chain(std::iter::once(v.en_complexe()));
            for (case, val) in corps.inconnues.iter_mut().zip(valeurs_args) {
                case.valeur = val;
            }

            let mut interne = JournalErreurs::new();
            let r = reduire::<T>(corps, &mut interne);
            if r.est_nan() {
                let detail = interne
                    .erreurs()
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "résultat indéfini".to_string());
                let genre = interne
                    .erreurs()
                    .first()
                    .map(|e| e.genre)
                    .unwrap_or(GenreErreur::Domaine);
                noter::<T>(journal, genre, position, format!("dans '{nom}' : {detail}"));
            }
            r
        }
    }
}

