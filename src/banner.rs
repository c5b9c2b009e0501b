// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
  ___  ___  ___   ___
 / __|/ __|/ _ \ / _ \
| (__| (__| (_) | (_) |
 \___|\___|\__, |\__, |
           /_/    /_/

    cc99 compile & run service
"#;
    println!("{}", banner);
}
