//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - expressions bien formées : seules les erreurs d’évaluation sont admises
//! - texte quelconque : jamais de panique, positions toujours dans le texte

use std::time::{Duration, Instant};

use num_complex::Complex64;

use super::{compile, solve_once, Echec, GenreErreur, Registre};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn est_erreur_attendue(g: GenreErreur, imaginaire_en_reel: bool) -> bool {
    // Liste blanche : une expression bien formée ne peut échouer qu’à l’évaluation,
    // sauf l’unité imaginaire lue en réel strict (erreur de syntaxe documentée).
    match g {
        GenreErreur::Domaine | GenreErreur::Depassement => true,
        GenreErreur::Syntaxe => imaginaire_en_reel,
        _ => false,
    }
}

fn memes_valeurs(a: Complex64, b: Complex64) -> bool {
    // bit à bit (déterminisme strict)
    a.re.to_bits() == b.re.to_bits() && a.im.to_bits() == b.im.to_bits()
}

fn memes_resultats(a: &Result<Complex64, Echec>, b: &Result<Complex64, Echec>) -> bool {
    match (a, b) {
        (Ok(x), Ok(y)) => memes_valeurs(*x, *y),
        (Err(x), Err(y)) => x == y,
        _ => false,
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_nombre(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 => "0".to_string(),
        1 => format!("{}", rng.pick(10)),
        2 => format!("{}.{}", rng.pick(100), rng.pick(10)),
        3 => format!("{}e{}", 1 + rng.pick(9), rng.pick(4)),
        4 => "pi".to_string(),
        _ => "e".to_string(),
    }
}

fn gen_atome(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 | 1 | 2 => gen_nombre(rng),
        3 => "x".to_string(),
        4 => "i".to_string(),
        _ => "ans".to_string(),
    }
}

const FONCTIONS: &[&str] = &[
    "sqrt", "ln", "log", "sin", "cos", "tan", "exp", "abs", "asin", "acos", "atanh", "floor",
    "arg", "conj",
];

const OPERATEURS: &[char] = &['+', '-', '*', '/', '^'];

fn gen_expr(rng: &mut Rng, profondeur: usize) -> String {
    if profondeur == 0 {
        return gen_atome(rng);
    }

    match rng.pick(8) {
        0 => gen_atome(rng),
        1 | 2 | 3 => {
            let op = OPERATEURS[rng.pick(OPERATEURS.len() as u32) as usize];
            format!(
                "{}{}{}",
                gen_expr(rng, profondeur - 1),
                op,
                gen_expr(rng, profondeur - 1)
            )
        }
        4 => format!("({})", gen_expr(rng, profondeur - 1)),
        5 => {
            let f = FONCTIONS[rng.pick(FONCTIONS.len() as u32) as usize];
            format!("{f}({})", gen_expr(rng, profondeur - 1))
        }
        6 => format!("-{}", gen_expr(rng, profondeur - 1)),
        _ => {
            // multiplication implicite
            format!("{}({})", gen_nombre(rng), gen_expr(rng, profondeur - 1))
        }
    }
}

const ALPHABET: &[char] = &[
    '0', '1', '2', '.', 'e', 'x', 'i', 'p', 's', 'n', '(', ')', '+', '-', '*', '/', '^', '%', '!',
    ',', ' ', '#',
];

fn gen_bruit(rng: &mut Rng) -> String {
    let n = 1 + rng.pick(16) as usize;
    (0..n)
        .map(|_| ALPHABET[rng.pick(ALPHABET.len() as u32) as usize])
        .collect()
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_expressions_bien_formees() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let mut registre = Registre::new();
    registre.set_ans(Complex64::new(0.5, -1.0));

    // Même seed => mêmes expressions => mêmes sorties (déterminisme)
    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut vus_ok = 0usize;
    let mut vus_err = 0usize;

    for _ in 0..400 {
        budget(t0, max);

        let texte = gen_expr(&mut rng, 4);
        let mut expr = compile(&texte, &registre, &["x"])
            .unwrap_or_else(|e| panic!("compile({texte:?}) : {e}"));
        expr.set_unknown("x", f64::from(rng.pick(7)) - 3.0)
            .unwrap_or_else(|e| panic!("{e}"));

        let complexe = rng.coin();
        let a = expr.evaluate(complexe);
        let b = expr.duplicate().evaluate(complexe);
        let c = expr.evaluate(complexe);
        assert!(memes_resultats(&a, &b), "duplicate diverge : {texte:?}");
        assert!(memes_resultats(&a, &c), "réévaluation diverge : {texte:?}");

        match a {
            Ok(_) => vus_ok += 1,
            Err(e) => {
                assert!(!e.erreurs.is_empty(), "échec sans diagnostic : {texte:?}");
                for err in &e.erreurs {
                    assert!(
                        est_erreur_attendue(err.genre, !complexe && expr.est_imaginaire()),
                        "erreur non attendue: expr={texte:?} err={err}"
                    );
                    assert!(err.position < expr.source().chars().count());
                }
                vus_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(vus_ok > 50, "trop peu de succès: {vus_ok}");
    assert!(vus_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_texte_quelconque() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let mut rng = Rng::new(0xBADC0DE_u64);
    let registre = Registre::new();

    for _ in 0..2000 {
        budget(t0, max);

        let texte = gen_bruit(&mut rng);
        // positions bornées par la chaîne de référence (validée, ou brute sans blancs)
        let borne = texte.chars().filter(|c| !c.is_whitespace()).count() * 2 + 1;

        match solve_once(&texte, &registre) {
            Ok(v) => assert!(!v.re.is_nan() && !v.im.is_nan(), "{texte:?}"),
            Err(e) => {
                assert!(!e.erreurs.is_empty(), "échec sans diagnostic : {texte:?}");
                for err in &e.erreurs {
                    assert!(err.position < borne, "{texte:?} : {err}");
                }
            }
        }
    }
}

#[test]
fn fuzz_safe_chaine_longue_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    // imbrication profonde : ((((...1...)+1)+1)...)
    let mut texte = "1".to_string();
    for _ in 0..300 {
        texte = format!("({texte}+1)");
    }
    budget(t0, max);

    let v = solve_once(&texte, &Registre::new()).unwrap_or_else(|e| panic!("err: {e}"));
    assert_eq!(v, Complex64::from(301.0));
    budget(t0, max);
}
