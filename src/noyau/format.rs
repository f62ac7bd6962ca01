// src/noyau/format.rs
//
// Affichage des résultats :
// - réel      : style "%.Ng" (N chiffres significatifs, zéros de queue retirés)
// - complexe  : "a+bi", "a-bi", "bi", "-i", ...
// - fraction  : fraction continue d’un décimal (3/4, 1/3, -5/8), si elle est courte

use num_complex::Complex64;
use num_rational::Ratio;

/// Dénominateur maximal proposé pour l’affichage en fraction.
pub const DENOMINATEUR_MAX: i64 = 10_000;

/* ------------------------ Réels ------------------------ */

fn sans_zeros_de_queue(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Équivalent de printf("%.*g", chiffres, x).
pub fn format_reel(x: f64, chiffres: usize) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }

    let p = chiffres.max(1);
    // exposant décimal après arrondi à p chiffres
    let sci = format!("{:.*e}", p - 1, x);
    let (mantisse, exposant) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exposant < -4 || exposant >= p as i32 {
        let signe = if exposant < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            sans_zeros_de_queue(mantisse),
            signe,
            exposant.unsigned_abs()
        )
    } else {
        let decimales = (p as i32 - 1 - exposant).max(0) as usize;
        let fixe = format!("{:.*}", decimales, x);
        sans_zeros_de_queue(&fixe).to_string()
    }
}

/* ------------------------ Complexes ------------------------ */

pub fn format_complexe(z: Complex64, chiffres: usize) -> String {
    if z.im == 0.0 {
        return format_reel(z.re, chiffres);
    }

    let im = match format_reel(z.im.abs(), chiffres).as_str() {
        "1" => "i".to_string(),
        m => format!("{m}i"),
    };

    if z.re == 0.0 {
        return if z.im < 0.0 { format!("-{im}") } else { im };
    }

    let signe = if z.im < 0.0 { '-' } else { '+' };
    format!("{}{}{}", format_reel(z.re, chiffres), signe, im)
}

/* ------------------------ Fractions ------------------------ */

/// Meilleure approximation rationnelle par fraction continue.
///
/// `None` si x est entier, non fini, ou si aucune réduite de dénominateur
/// <= `denominateur_max` ne redonne x (à 1e-10 relatif près).
pub fn en_fraction(x: f64, denominateur_max: i64) -> Option<Ratio<i64>> {
    if !x.is_finite() || x.fract() == 0.0 || x.abs() > 1e15 {
        return None;
    }

    // réduites h/k
    let (mut h0, mut h1) = (0i64, 1i64);
    let (mut k0, mut k1) = (1i64, 0i64);
    let mut reste = x;

    for _ in 0..64 {
        let a = reste.floor();
        if a.abs() > 1e15 {
            return None;
        }
        let a = a as i64;

        let h2 = a.checked_mul(h1)?.checked_add(h0)?;
        let k2 = a.checked_mul(k1)?.checked_add(k0)?;
        if k2 > denominateur_max {
            return None;
        }
        (h0, h1) = (h1, h2);
        (k0, k1) = (k1, k2);

        if (h1 as f64 / k1 as f64 - x).abs() <= 1e-10 * x.abs().max(1.0) {
            return Some(Ratio::new(h1, k1));
        }

        let f = reste - a as f64;
        if f == 0.0 {
            return None;
        }
        reste = 1.0 / f;
    }
    None
}

pub fn format_fraction(r: &Ratio<i64>) -> String {
    if r.is_integer() {
        format!("{}", r.numer())
    } else {
        format!("{}/{}", r.numer(), r.denom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reels_facon_printf_g() {
        assert_eq!(format_reel(14.0, 14), "14");
        assert_eq!(format_reel(0.1 + 0.2, 14), "0.3");
        assert_eq!(format_reel(-2.5, 14), "-2.5");
        assert_eq!(format_reel(std::f64::consts::PI, 6), "3.14159");
        assert_eq!(format_reel(1234567.0, 3), "1.23e+06");
        assert_eq!(format_reel(0.0001, 6), "0.0001");
        assert_eq!(format_reel(0.00001, 6), "1e-05");
        assert_eq!(format_reel(1e20, 14), "1e+20");
        assert_eq!(format_reel(f64::NAN, 6), "nan");
        // l’arrondi peut faire monter l’exposant
        assert_eq!(format_reel(999999.7, 6), "1e+06");
    }

    #[test]
    fn complexes() {
        assert_eq!(format_complexe(Complex64::new(0.0, 2.0), 14), "2i");
        assert_eq!(format_complexe(Complex64::new(0.0, -1.0), 14), "-i");
        assert_eq!(format_complexe(Complex64::new(1.0, 1.0), 14), "1+i");
        assert_eq!(format_complexe(Complex64::new(3.0, -0.5), 14), "3-0.5i");
        assert_eq!(format_complexe(Complex64::new(-4.0, 0.0), 14), "-4");
    }

    #[test]
    fn fractions() {
        assert_eq!(en_fraction(0.75, DENOMINATEUR_MAX), Some(Ratio::new(3, 4)));
        assert_eq!(en_fraction(1.0 / 3.0, DENOMINATEUR_MAX), Some(Ratio::new(1, 3)));
        assert_eq!(en_fraction(-0.625, DENOMINATEUR_MAX), Some(Ratio::new(-5, 8)));
        assert_eq!(en_fraction(2.0, DENOMINATEUR_MAX), None);
        assert_eq!(en_fraction(std::f64::consts::PI, DENOMINATEUR_MAX), None);
        assert_eq!(format_fraction(&Ratio::new(-5, 8)), "-5/8");
        assert_eq!(format_fraction(&Ratio::new(4, 2)), "2");
    }
}
