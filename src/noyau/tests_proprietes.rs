//! Tests de propriétés (proptest) : invariants du noyau sur des entrées générées.

use num_complex::Complex64;
use proptest::prelude::*;

use super::{compile, solve_once, GenreErreur, Registre};

fn resoudre(texte: &str) -> Result<Complex64, GenreErreur> {
    solve_once(texte, &Registre::new())
        .map_err(|e| e.premiere().map(|e| e.genre).unwrap_or(GenreErreur::Syntaxe))
}

// Petits entiers : calculs exacts en f64
fn petit_entier() -> impl Strategy<Value = i64> {
    -50i64..50i64
}

fn entier_non_nul() -> impl Strategy<Value = i64> {
    prop_oneof![(-50i64..=-1i64), (1i64..=50i64)]
}

// Expressions bien formées, sans inconnue
fn expression() -> impl Strategy<Value = String> {
    let feuille = prop_oneof![
        (0u32..100).prop_map(|n| n.to_string()),
        Just("pi".to_string()),
        Just("e".to_string()),
    ];
    feuille.prop_recursive(4, 24, 2, |interne| {
        prop_oneof![
            (interne.clone(), prop::sample::select(vec!['+', '-', '*', '/', '^']), interne.clone())
                .prop_map(|(a, op, b)| format!("{a}{op}{b}")),
            interne.clone().prop_map(|a| format!("({a})")),
            interne.clone().prop_map(|a| format!("-{a}")),
            (prop::sample::select(vec!["sin", "cos", "sqrt", "ln", "abs"]), interne)
                .prop_map(|(f, a)| format!("{f}({a})")),
        ]
    })
}

fn memes(a: &Result<Complex64, GenreErreur>, b: &Result<Complex64, GenreErreur>) -> bool {
    match (a, b) {
        (Ok(x), Ok(y)) => {
            x.re.to_bits() == y.re.to_bits() && x.im.to_bits() == y.im.to_bits()
        }
        (Err(x), Err(y)) => x == y,
        _ => false,
    }
}

proptest! {
    // Priorités : * avant +, gauche à droite pour -
    #[test]
    fn priorites_entieres(a in petit_entier(), b in petit_entier(), c in petit_entier()) {
        let texte = format!("{a}+{b}*{c}-{a}");
        let attendu = (a + b * c - a) as f64;
        prop_assert_eq!(resoudre(&texte), Ok(Complex64::from(attendu)));
    }

    // Puissance : associativité gauche (a^b^c = (a^b)^c)
    #[test]
    fn puissance_gauche_a_droite(a in 1i32..5, b in 0i32..4, c in 0i32..3) {
        let texte = format!("{a}^{b}^{c}");
        let attendu = f64::from(a).powi(b).powi(c);
        prop_assert_eq!(resoudre(&texte), Ok(Complex64::from(attendu)));
    }

    // compile + evaluate(complexe permis) ≡ solve_once
    #[test]
    fn solve_once_equivaut_a_compile_evaluate(texte in expression()) {
        let registre = Registre::new();
        let direct = solve_once(&texte, &registre);
        let mut e = compile(&texte, &registre, &[]).expect("expression bien formée");
        let deux_temps = e.evaluate(true);
        match (direct, deux_temps) {
            (Ok(x), Ok(y)) => {
                prop_assert_eq!(x.re.to_bits(), y.re.to_bits());
                prop_assert_eq!(x.im.to_bits(), y.im.to_bits());
            }
            (Err(x), Err(y)) => prop_assert_eq!(x, y),
            (x, y) => prop_assert!(false, "divergence : {:?} / {:?}", x, y),
        }
    }

    // Les blancs ne changent rien
    #[test]
    fn blancs_sans_effet(texte in expression()) {
        let espace: String = texte.chars().flat_map(|c| [c, ' ']).collect();
        prop_assert!(memes(&resoudre(&texte), &resoudre(&espace)));
    }

    // Multiplication implicite : "n pi" ≡ "n*pi", "n(x)" ≡ "n*(x)"
    #[test]
    fn multiplication_implicite(n in 0u32..1000, texte in expression()) {
        let (implicite, explicite) = (format!("{n}pi"), format!("{n}*pi"));
        prop_assert!(memes(&resoudre(&implicite), &resoudre(&explicite)));

        let (implicite, explicite) = (format!("{n}({texte})"), format!("{n}*({texte})"));
        prop_assert!(memes(&resoudre(&implicite), &resoudre(&explicite)));
    }

    // Parenthèse ouvrante orpheline : signalée à sa position
    #[test]
    fn parenthese_non_fermee(texte in expression()) {
        let ouvert = format!("({texte}");
        let e = compile(&ouvert, &Registre::new(), &[]).unwrap_err();
        prop_assert_eq!(e.genre, GenreErreur::ParentheseDesequilibree);
        prop_assert_eq!(e.position, 0);
    }

    // Division par zéro : erreur de domaine, jamais de panique
    #[test]
    fn division_par_zero(a in petit_entier()) {
        let (direct, calcule) = (format!("{a}/0"), format!("{a}/(1-1)"));
        prop_assert_eq!(resoudre(&direct), Err(GenreErreur::Domaine));
        prop_assert_eq!(resoudre(&calcule), Err(GenreErreur::Domaine));
    }

    // Racine d’un négatif : domaine en réel strict, imaginaire pur sinon
    #[test]
    fn racine_negative(n in 1u32..10_000) {
        let texte = format!("sqrt(-{n})");
        let mut e = compile(&texte, &Registre::new(), &[]).unwrap();
        let echec = e.evaluate(false).unwrap_err();
        prop_assert!(echec.contient(GenreErreur::Domaine));

        let z = e.evaluate(true).unwrap();
        prop_assert_eq!(z.re, 0.0);
        prop_assert!((z.im - f64::from(n).sqrt()).abs() < 1e-9);
    }

    // set_unknown + evaluate : idempotent, sans recompilation
    #[test]
    fn substitution_idempotente(x in -100.0f64..100.0, y in -100.0f64..100.0) {
        let mut e = compile("3x^2-x/7+1", &Registre::new(), &["x"]).unwrap();
        e.set_unknown("x", x).unwrap();
        let premier = e.evaluate(false).unwrap();
        prop_assert_eq!(e.evaluate(false).unwrap(), premier);

        e.set_unknown("x", y).unwrap();
        let _ = e.evaluate(false).unwrap();
        e.set_unknown("x", x).unwrap();
        prop_assert_eq!(e.evaluate(false).unwrap(), premier);
    }

    // Copies indépendantes
    #[test]
    fn duplicate_independante(x in petit_entier(), y in entier_non_nul()) {
        let mut a = compile("x*10+1", &Registre::new(), &["x"]).unwrap();
        a.set_unknown("x", x as f64).unwrap();
        let mut b = a.duplicate();
        b.set_unknown("x", y as f64).unwrap();

        prop_assert_eq!(a.evaluate(false).unwrap(), Complex64::from((x * 10 + 1) as f64));
        prop_assert_eq!(b.evaluate(false).unwrap(), Complex64::from((y * 10 + 1) as f64));
        prop_assert_eq!(a.unknown("x"), Some(Complex64::from(x as f64)));
    }
}
