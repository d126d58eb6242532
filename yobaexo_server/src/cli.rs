use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Secrets are deliberately absent from this list
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "YOBA_HOST",
        "YOBA_PORT",
        "YOBA_DATABASE_URL",
        "YOBA_RAZORPAY_KEY_ID",
        "YOBA_RAZORPAY_API_URL",
        "YOBA_WEBHOOK_SIGNATURE_CHECKS",
        "YOBA_YOUTUBE_CHANNEL_ID",
        "YOBA_YOUTUBE_API_URL",
        "YOBA_EMAILJS_SERVICE_ID",
        "YOBA_EMAILJS_TEMPLATE_ID",
        "YOBA_CONTACT_EMAIL",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
