//! Print an Argon2id PHC hash for a password read from stdin.
//!
//! The output goes into `usuarios_app.senha_hash` or a `ROSTER_USERS` entry.
//! The service never creates users itself:
//!
//! ```text
//! echo -n 'secret' | hash-password
//! mysql> INSERT INTO usuarios_app (usuario, senha_hash, ativo) VALUES ('ana', '<hash>', 1);
//! ```

use std::io::Read;
use std::process::ExitCode;

use roster_api::auth::password::hash_password;

fn main() -> ExitCode {
    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("Failed to read password from stdin: {e}");
        return ExitCode::FAILURE;
    }

    let password = input.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        eprintln!("Password must not be empty");
        return ExitCode::FAILURE;
    }

    match hash_password(password) {
        Ok(hash) => {
            println!("{hash}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Hashing failed: {e}");
            ExitCode::FAILURE
        }
    }
}
