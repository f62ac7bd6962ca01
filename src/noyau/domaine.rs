// src/noyau/domaine.rs
//
// Domaines numériques : réel (f64, chemin rapide) et complexe (Complex64, repli).
// Le réducteur est générique sur `Scalaire` ; seul ce fichier sait compter
// dans chaque domaine.

use std::f64::consts::PI;
use std::fmt;
use std::ops::Neg;

use num_complex::Complex64;
use num_traits::{Num, Zero};

use super::fonctions::{factorielle_reelle, Interne};
use super::reduction::Chantier;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Domaine {
    Reel,
    Complexe,
}

impl fmt::Display for Domaine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domaine::Reel => f.write_str("réel"),
            Domaine::Complexe => f.write_str("complexe"),
        }
    }
}

pub trait Scalaire: Copy + fmt::Debug + Num + Neg<Output = Self> {
    const DOMAINE: Domaine;

    fn nan() -> Self;

    /// `None` si la valeur n’existe pas dans ce domaine (partie imaginaire en réel).
    fn depuis_complexe(c: Complex64) -> Option<Self>;

    fn en_complexe(self) -> Complex64;

    fn est_nan(self) -> bool;

    fn est_infini(self) -> bool;

    /// `0^x` avec x < 0 est une division par zéro.
    fn puissance(self, exposant: Self) -> Result<Self, &'static str>;

    fn modulo(self, diviseur: Self) -> Result<Self, &'static str>;

    fn factorielle(self) -> Result<Self, &'static str>;

    /// Résultat brut : NaN / infini sont classés par l’appelant.
    fn appliquer(self, f: Interne) -> Result<Self, &'static str>;

    /// Espace de travail du réducteur propre à ce domaine.
    fn chantier<'a>(
        reel: &'a mut Chantier<f64>,
        complexe: &'a mut Chantier<Complex64>,
    ) -> &'a mut Chantier<Self>;
}

/* ------------------------ Réel ------------------------ */

impl Scalaire for f64 {
    const DOMAINE: Domaine = Domaine::Reel;

    fn nan() -> Self {
        f64::NAN
    }

    fn depuis_complexe(c: Complex64) -> Option<Self> {
        (c.im == 0.0).then_some(c.re)
    }

    fn en_complexe(self) -> Complex64 {
        Complex64::new(self, 0.0)
    }

    fn est_nan(self) -> bool {
        self.is_nan()
    }

    fn est_infini(self) -> bool {
        self.is_infinite()
    }

    fn puissance(self, exposant: Self) -> Result<Self, &'static str> {
        if self == 0.0 && exposant < 0.0 {
            return Err("division par zéro (puissance négative de 0)");
        }
        Ok(self.powf(exposant))
    }

    fn modulo(self, diviseur: Self) -> Result<Self, &'static str> {
        if diviseur == 0.0 {
            return Err("modulo par zéro");
        }
        Ok(self % diviseur)
    }

    fn factorielle(self) -> Result<Self, &'static str> {
        factorielle_reelle(self).ok_or("factorielle d’un nombre non entier ou négatif")
    }

    fn appliquer(self, f: Interne) -> Result<Self, &'static str> {
        use Interne::*;

        let x = self;
        Ok(match f {
            Abs => x.abs(),
            Ceil => x.ceil(),
            Floor => x.floor(),
            Round => x.round(),
            Sign => {
                if x == 0.0 {
                    0.0
                } else {
                    x.signum()
                }
            }
            Sqrt => x.sqrt(),
            Cbrt => x.cbrt(),
            Exp => x.exp(),
            Ln => x.ln(),
            Log => x.log10(),
            Sin => x.sin(),
            Cos => x.cos(),
            Tan => x.tan(),
            Asin => x.asin(),
            Acos => x.acos(),
            Atan => x.atan(),
            Sinh => x.sinh(),
            Cosh => x.cosh(),
            Tanh => x.tanh(),
            Asinh => x.asinh(),
            Acosh => x.acosh(),
            Atanh => x.atanh(),
            Fact => return x.factorielle(),
            Arg => {
                if x < 0.0 {
                    PI
                } else {
                    0.0
                }
            }
            Re | Conj => x,
            Im => 0.0,
        })
    }

    fn chantier<'a>(
        reel: &'a mut Chantier<f64>,
        _complexe: &'a mut Chantier<Complex64>,
    ) -> &'a mut Chantier<Self> {
        reel
    }
}

/* ------------------------ Complexe ------------------------ */

impl Scalaire for Complex64 {
    const DOMAINE: Domaine = Domaine::Complexe;

    fn nan() -> Self {
        Complex64::new(f64::NAN, f64::NAN)
    }

    fn depuis_complexe(c: Complex64) -> Option<Self> {
        Some(c)
    }

    fn en_complexe(self) -> Complex64 {
        self
    }

    fn est_nan(self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }

    fn est_infini(self) -> bool {
        !self.est_nan() && (self.re.is_infinite() || self.im.is_infinite())
    }

    fn puissance(self, exposant: Self) -> Result<Self, &'static str> {
        if self.is_zero() && exposant.re < 0.0 {
            return Err("division par zéro (puissance négative de 0)");
        }
        // exposant entier : powi (exact pour i^2, (1+i)^4, ...)
        if exposant.im == 0.0
            && exposant.re.fract() == 0.0
            && exposant.re.abs() <= f64::from(i32::MAX)
        {
            return Ok(self.powi(exposant.re as i32));
        }
        if self.is_zero() {
            return Ok(if exposant.re > 0.0 {
                Complex64::zero()
            } else {
                Self::nan()
            });
        }
        Ok(self.powc(exposant))
    }

    fn modulo(self, _diviseur: Self) -> Result<Self, &'static str> {
        Err("modulo indisponible en mode complexe")
    }

    fn factorielle(self) -> Result<Self, &'static str> {
        if self.im != 0.0 {
            return Err("factorielle d’un nombre complexe");
        }
        self.re.factorielle().map(Complex64::from)
    }

    fn appliquer(self, f: Interne) -> Result<Self, &'static str> {
        use Interne::*;

        if f.reel_seulement() {
            if self.im != 0.0 {
                return Err("fonction réservée aux réels");
            }
            return self.re.appliquer(f).map(Complex64::from);
        }

        let z = self;
        Ok(match f {
            Abs => Complex64::from(z.norm()),
            Sqrt => z.sqrt(),
            Cbrt => z.cbrt(),
            Exp => z.exp(),
            Ln => z.ln(),
            Log => z.log10(),
            Sin => z.sin(),
            Cos => z.cos(),
            Tan => z.tan(),
            Asin => z.asin(),
            Acos => z.acos(),
            Atan => z.atan(),
            Sinh => z.sinh(),
            Cosh => z.cosh(),
            Tanh => z.tanh(),
            Asinh => z.asinh(),
            Acosh => z.acosh(),
            Atanh => z.atanh(),
            Arg => Complex64::from(z.arg()),
            Re => Complex64::from(z.re),
            Im => Complex64::from(z.im),
            Conj => z.conj(),
            // couverts par reel_seulement()
            Ceil | Floor | Round | Sign | Fact => return Err("fonction réservée aux réels"),
        })
    }

    fn chantier<'a>(
        _reel: &'a mut Chantier<f64>,
        complexe: &'a mut Chantier<Complex64>,
    ) -> &'a mut Chantier<Self> {
        complexe
    }
}
