// src/main.rs
//
// Calculatrice scientifique — point d’entrée terminal
// ---------------------------------------------------
// - Arguments : chaque argument est une ligne (expr, nom=expr, f(x)=corps,
//   trace / derivee / integrale)
// - Sans argument : lecture ligne à ligne de l’entrée standard ("exit" pour finir)
// - Résultats sur stdout, erreurs (avec caret) sur stderr
// - Journalisation : --log / CALC_LOG (défaut "warn"), sur stderr
//
// Code de sortie : échec si au moins une ligne a échoué.

use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use calculatrice_sci::app::{ErreurSession, Reglages, Session};

/// Calculatrice scientifique : réel d’abord, repli complexe si nécessaire.
#[derive(Parser, Debug)]
#[command(
    name = "calculatrice",
    version,
    about = "Calculatrice scientifique (réel, repli complexe, fonctions utilisateur)",
    after_help = r#"
Variables d’environnement :
  CALC_CHIFFRES=14     Chiffres significatifs affichés (1 à 17)
  CALC_REEL=true       Réel strict (pas de repli complexe)
  CALC_FRACTIONS=true  Affiche aussi la fraction (3/4)
  CALC_LOG=debug       Filtre de journalisation (error, warn, info, debug, trace)

Commandes (inconnue x, arguments séparés par ';') :
  trace f; début; fin; pas    pas : "0.5" (ajout), "2*" (produit), "2^" (puissance)
  derivee f; x0
  integrale f; a; b

Exemples :
  calculatrice "2+3*4" "sqrt(-4)"
  calculatrice "f(x)=x^2+1" "f(3)" "ans/2"
  calculatrice "trace sin(x); 0; pi; pi/4" "integrale x^2; 0; 3"
"#
)]
struct Args {
    #[command(flatten)]
    reglages: Reglages,

    /// Filtre de journalisation
    #[arg(long, env = "CALC_LOG", default_value = "warn")]
    log: String,

    /// Lignes à exécuter (sinon : entrée standard)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    lignes: Vec<String>,
}

fn installer_journal(filtre: &str) {
    let filtre = EnvFilter::try_new(filtre).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filtre)
        .with_writer(io::stderr)
        .init();
}

/// Exécute une ligne et affiche ; rend false en cas d’échec.
fn executer(session: &mut Session, ligne: &str) -> bool {
    match session.executer(ligne) {
        Ok(sortie) => {
            println!("{}", session.rendre_sortie(&sortie));
            true
        }
        Err(ErreurSession::Vide) => true,
        Err(e) => {
            eprintln!("{}", session.rendre_erreur(&e));
            false
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    installer_journal(&args.log);

    let mut session = Session::new(args.reglages);
    info!(reglages = ?session.reglages(), "session ouverte");

    let mut echecs = 0usize;

    if args.lignes.is_empty() {
        for ligne in io::stdin().lock().lines() {
            let Ok(ligne) = ligne else {
                break;
            };
            if ligne.trim() == "exit" {
                break;
            }
            if !executer(&mut session, &ligne) {
                echecs += 1;
            }
        }
    } else {
        for ligne in &args.lignes {
            if !executer(&mut session, ligne) {
                echecs += 1;
            }
        }
    }

    if echecs == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
