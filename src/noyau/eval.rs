//! Noyau — compilation et évaluation
//!
//! texte -> validation -> découpe -> construction (ExprCompilee)
//!       -> réduction réelle -> (repli) réduction complexe
//!
//! Remarque : une expression compilée est réutilisable. Changer une inconnue
//! (set_unknown) puis réévaluer ne refait ni la validation ni la découpe.

use num_complex::Complex64;
use tracing::debug;

use super::chaine::construire;
use super::decoupe::decouper;
use super::domaine::Scalaire;
use super::erreur::{Echec, ErreurCalcul, JournalErreurs};
use super::expr::ExprCompilee;
use super::jetons::retirer_blancs;
use super::reduction::reduire;
use super::registre::Registre;
use super::validation::valider;

/// API publique : compile `texte` une fois pour de nombreuses évaluations.
///
/// `inconnues` : noms laissés libres (valeur 0 tant que `set_unknown` n’a pas été appelé).
/// Les positions d’erreur se réfèrent à la chaîne validée (sans blancs,
/// multiplications implicites insérées).
pub fn compile(
    texte: &str,
    registre: &Registre,
    inconnues: &[&str],
) -> Result<ExprCompilee, ErreurCalcul> {
    compiler_dans(texte, registre, inconnues, &[])
}

/// `pile` : fonctions utilisateur en cours d’expansion (refus de la récursion).
pub(crate) fn compiler_dans(
    texte: &str,
    registre: &Registre,
    inconnues: &[&str],
    pile: &[String],
) -> Result<ExprCompilee, ErreurCalcul> {
    let brut = retirer_blancs(texte);
    let valide = valider(&brut, registre)?;
    let chars: Vec<char> = valide.chars().collect();
    let decoupage = decouper(&chars, registre)?;
    let expr = construire(valide, &chars, decoupage, registre, inconnues, pile)?;

    debug!(
        source = expr.source(),
        sous_expressions = expr.sous_expressions().len(),
        inconnues = expr.nb_inconnues(),
        imaginaire = expr.est_imaginaire(),
        reel_seulement = expr.est_reel_seulement(),
        "expression compilée"
    );
    Ok(expr)
}

/// Compile puis évalue une seule fois (complexe permis).
pub fn solve_once(texte: &str, registre: &Registre) -> Result<Complex64, Echec> {
    let mut expr = compile(texte, registre, &[])?;
    expr.evaluate(true)
}

impl ExprCompilee {
    /// Évalue avec les valeurs courantes des inconnues.
    pub fn evaluate(&mut self, complexe_permis: bool) -> Result<Complex64, Echec> {
        let mut journal = JournalErreurs::new();
        let v = self.evaluate_with(complexe_permis, &mut journal);
        if v.est_nan() {
            Err(journal.vers_echec())
        } else {
            Ok(v)
        }
    }

    /// Variante bas niveau : NaN en cas d’échec, diagnostics dans `journal`
    /// (vidé au départ de chaque évaluation).
    ///
    /// Passe réelle d’abord. Si elle échoue et que l’expression le permet,
    /// les erreurs réelles sont archivées et la passe complexe est tentée :
    /// - succès : archive jetée ;
    /// - échec : les erreurs réelles reviennent.
    pub fn evaluate_with(&mut self, complexe_permis: bool, journal: &mut JournalErreurs) -> Complex64 {
        journal.effacer();

        if self.imaginaire && complexe_permis {
            debug!(source = %self.source, "unité imaginaire : passe complexe directe");
            return reduire::<Complex64>(self, journal);
        }

        let r = reduire::<f64>(self, journal);
        if !r.is_nan() {
            return Complex64::from(r);
        }

        if !complexe_permis || self.reel_seulement || journal.est_vide() {
            return Complex64::nan();
        }

        debug!(
            source = %self.source,
            erreurs = journal.erreurs().len(),
            "échec réel : nouvel essai en complexe"
        );
        journal.archiver();
        let c = reduire::<Complex64>(self, journal);
        if c.est_nan() {
            journal.restaurer();
        } else {
            journal.jeter_archive();
        }
        c
    }
}
