// src/noyau/analyse.rs
//
// Analyse numérique sur une expression compilée, selon une inconnue, en réel.
// - derivee   : différence centrée
// - integrale : Simpson composite
//
// La valeur de l’inconnue est remise en place à la fin (succès ou échec).

use num_complex::Complex64;

use super::erreur::{Echec, ErreurCalcul, GenreErreur};
use super::expr::ExprCompilee;

/// Nombre d’intervalles par défaut pour `integrale`.
pub const INTERVALLES_SIMPSON: usize = 1000;

fn absente(variable: &str) -> Echec {
    Echec::from(ErreurCalcul::compilation(
        GenreErreur::NomIndefini,
        0,
        format!("'{variable}' n’est pas une inconnue de cette expression"),
    ))
}

/// f(x) en réel strict.
fn image(expr: &mut ExprCompilee, variable: &str, x: f64) -> Result<f64, Echec> {
    expr.set_unknown(variable, x)?;
    expr.evaluate(false).map(|v| v.re)
}

/// Exécute `calcul` puis restaure la valeur initiale de l’inconnue.
fn en_preservant<T>(
    expr: &mut ExprCompilee,
    variable: &str,
    calcul: impl FnOnce(&mut ExprCompilee) -> Result<T, Echec>,
) -> Result<T, Echec> {
    let initiale: Complex64 = expr.unknown(variable).ok_or_else(|| absente(variable))?;
    let r = calcul(expr);
    expr.set_unknown(variable, initiale)?;
    r
}

/// f'(x) ≈ (f(x+h) - f(x-h)) / 2h, h relatif à |x|.
pub fn derivee(expr: &mut ExprCompilee, variable: &str, x: f64) -> Result<f64, Echec> {
    let h = 1e-5 * x.abs().max(1.0);
    en_preservant(expr, variable, |e| {
        let avant = image(e, variable, x - h)?;
        let apres = image(e, variable, x + h)?;
        Ok((apres - avant) / (2.0 * h))
    })
}

/// ∫[a, b] f ; `intervalles` est arrondi au pair supérieur (minimum 2).
/// a > b donne l’opposé de ∫[b, a].
pub fn integrale(
    expr: &mut ExprCompilee,
    variable: &str,
    a: f64,
    b: f64,
    intervalles: usize,
) -> Result<f64, Echec> {
    let n = intervalles.max(2).next_multiple_of(2);
    let h = (b - a) / n as f64;

    en_preservant(expr, variable, |e| {
        let mut somme = image(e, variable, a)? + image(e, variable, b)?;
        for k in 1..n {
            let poids = if k % 2 == 1 { 4.0 } else { 2.0 };
            somme += poids * image(e, variable, a + k as f64 * h)?;
        }
        Ok(somme * h / 3.0)
    })
}
