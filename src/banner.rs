// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    // Using a raw string literal for the multi-line banner
    let banner = r#"
  ___                      _ _            _                _
 / __| ___ __ _  _ _ _ ___| | |_ _  _    /_\  _ _  __ _ __| |_  _ ______ _ _
 \__ \/ -_) _| || | '_| | |  _| || |  / _ \| ' \/ _` / _| | || |_ / -_) '_|
 |___/\___\__|\_,_|_| |_|_|\__|\_, | /_/ \_\_||_\__,_\__|_|\_, /__\___|_|
                               |__/                        |__/

    Security Analysis Client
"#;
    println!("{}", banner);
}
