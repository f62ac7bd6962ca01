//! Tests scientifiques (campagne) : table "expr;attendu" + invariants + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//!
//! Notes :
//! - L’attendu est lui-même calculé par le noyau (forme plus simple), puis
//!   comparé en erreur relative ; un attendu nul exige |résultat| < 1e-12.
//! - Stress : la réduction n’est pas récursive (tables + indices), seule la
//!   découpe dépend de la profondeur des parenthèses. On reste sur des bornes
//!   raisonnables + budgets larges (tests en debug).

use std::time::{Duration, Instant};

use num_complex::Complex64;

use super::{compile, solve_once, GenreErreur, Registre};

fn ok(expr: &str) -> Complex64 {
    solve_once(expr, &Registre::new()).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn genre(expr: &str) -> GenreErreur {
    match solve_once(expr, &Registre::new()) {
        Ok(v) => panic!("expr={expr:?} devrait échouer, obtenu {v}"),
        Err(e) => e.premiere().map(|e| e.genre).unwrap_or_else(|| panic!("échec vide")),
    }
}

/// Ligne "expr;attendu".
fn verifier_ligne(ligne: &str) {
    let (expr, attendu) = ligne
        .split_once(';')
        .unwrap_or_else(|| panic!("ligne sans ';' : {ligne:?}"));
    let attendu = ok(attendu);
    let obtenu = ok(expr);

    if attendu == Complex64::new(0.0, 0.0) {
        assert!(obtenu.norm() < 1e-12, "expr={expr:?} obtenu={obtenu}");
    } else {
        let relative = ((attendu - obtenu) / attendu).norm();
        assert!(
            relative <= 1e-9,
            "expr={expr:?} attendu={attendu} obtenu={obtenu} (écart relatif {relative:e})"
        );
    }
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Table de référence ------------------------ */

const TABLE: &str = "\
2+3*4;14
(2+3)*4;20
2^3^2;64
(2^3)^2;64
2^(3^2);512
-2^2;-4
-2^2^2;-16
3*-2^2^2;-48
(-2)^2;4
2*-3;-6
10-4-3;3
100/10/5;2
7%3+1;2
-7%3;-1
5!;120
3!!;720
0!;1
2pi;2*pi
3(1+2);9
(1+2)(3+4);21
2e3;2000
1.5e-3*2;0.003
2e;2*e
sqrt(16)+cbrt(27);7
abs(-3)+sign(-8);2
floor(2.7)+ceil(2.2)+round(2.5);8
exp(ln(5));5
log(1000);3
sin(pi/6);0.5
cos(pi);-1
tan(pi/4);1
asin(1);pi/2
atan(1)*4;pi
cosh(0)+sinh(0)+tanh(0);1
asinh(0)+acosh(1)+atanh(0);0
fact(4);24
sqrt(-4);2i
(-8)^(1/3);1+sqrt(3)i
i^2;-1
(1+i)*(1-i);2
re(3+4i)+im(3+4i);7
abs(3+4i);5
conj(1+2i);1-2i
arg(i);pi/2
e^(i*pi);-1
ln(-1);pi*i
1/(1+i);0.5-0.5i";

#[test]
fn sci_table_de_reference() {
    for ligne in TABLE.lines() {
        verifier_ligne(ligne);
    }
}

/* ------------------------ Domaines ------------------------ */

#[test]
fn sci_reel_d_abord() {
    // résultat réel : partie imaginaire exactement nulle
    for expr in ["sqrt(2)^2", "sin(1)^2+cos(1)^2", "2^0.5", "ln(e)"] {
        assert_eq!(ok(expr).im, 0.0, "expr={expr:?}");
    }
}

#[test]
fn sci_repli_complexe_seulement_si_necessaire() {
    let mut e = compile("sqrt(x)", &Registre::new(), &["x"]).unwrap();
    e.set_unknown("x", 9.0).unwrap();
    assert_eq!(e.evaluate(true).unwrap(), Complex64::from(3.0));
    e.set_unknown("x", -9.0).unwrap();
    assert_eq!(e.evaluate(true).unwrap(), Complex64::new(0.0, 3.0));
    e.set_unknown("x", 9.0).unwrap();
    assert_eq!(e.evaluate(true).unwrap(), Complex64::from(3.0));
}

#[test]
fn sci_erreurs_par_genre() {
    assert_eq!(genre("(2+3"), GenreErreur::ParentheseDesequilibree);
    assert_eq!(genre("2+3)"), GenreErreur::ParentheseDesequilibree);
    assert_eq!(genre("2#3"), GenreErreur::CaractereIllegal);
    assert_eq!(genre("2+*3"), GenreErreur::Syntaxe);
    assert_eq!(genre("()"), GenreErreur::Syntaxe);
    assert_eq!(genre("sin()"), GenreErreur::Syntaxe);
    assert_eq!(genre("toto+1"), GenreErreur::NomIndefini);
    assert_eq!(genre("5/0"), GenreErreur::Domaine);
    assert_eq!(genre("ln(0)"), GenreErreur::Domaine);
    assert_eq!(genre("2.5!"), GenreErreur::Domaine);
    assert_eq!(genre("5%0"), GenreErreur::Domaine);
    assert_eq!(genre("0^-1"), GenreErreur::Domaine);
    assert_eq!(genre("exp(1000)"), GenreErreur::Depassement);
    assert_eq!(genre("171!"), GenreErreur::Depassement);
    assert_eq!(genre("1e400"), GenreErreur::Depassement);
}

#[test]
fn sci_poison_limite_a_la_sous_expression() {
    // les deux divisions fautives sont signalées, dans l’ordre des positions
    let e = solve_once("(1/0)+(2/0)+3", &Registre::new()).unwrap_err();
    let positions: Vec<usize> = e.erreurs.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![2, 8]);
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_profondeur() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // sqrt / ^2 alternés : reste égal à 4
    let mut expr = "4".to_string();
    for k in 0..60 {
        expr = if k % 2 == 0 {
            format!("sqrt({expr})")
        } else {
            format!("({expr})^2")
        };
        budget(t0, max);
    }

    let v = ok(&expr);
    assert!((v.re - 4.0).abs() < 1e-9, "obtenu {v}");
    budget(t0, max);
}

#[test]
fn sci_stress_longue_chaine() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // 2000 termes à plat : une seule sous-expression, 3999 noeuds
    let expr = vec!["1/2"; 2000].join("+");
    assert_eq!(ok(&expr), Complex64::from(1000.0));
    budget(t0, max);
}

#[test]
fn sci_stress_reevaluations() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // compilé une fois, évalué 10 000 fois
    let mut e = compile("x^2-2x+1", &Registre::new(), &["x"]).unwrap();
    for k in 0..10_000 {
        let x = k as f64 / 100.0;
        e.set_unknown("x", x).unwrap();
        let v = e.evaluate(false).unwrap();
        assert!((v.re - (x - 1.0).powi(2)).abs() < 1e-6, "x={x}");
    }
    budget(t0, max);
}
