mod cli;

use cli::Redirected;

fn main() {
    if let Err(e) = cli::run() {
        if let Some(redirect) = e.downcast_ref::<Redirected>() {
            eprintln!("{redirect}");
            std::process::exit(2);
        }
        eprintln!("{e:#}"); // pretty anyhow chain
        std::process::exit(1);
    }
}
