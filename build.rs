//! Stamps the metadata shown by `shoosh --version`: build date, target, profile, compiler.

use time::macros::format_description;
use time::OffsetDateTime;

fn stamp(key: &str, value: &str) {
    println!("cargo:rustc-env=SHOOSH_BUILD_{key}={value}");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let date = OffsetDateTime::now_utc()
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
        ))
        .unwrap_or_else(|_| "unknown".to_string());
    stamp("DATE", &date);

    for key in ["TARGET", "PROFILE"] {
        stamp(key, &std::env::var(key).unwrap_or_else(|_| "unknown".to_string()));
    }

    let rustc = rustc_version::version_meta()
        .map(|m| m.short_version_string)
        .unwrap_or_else(|_| "unknown".to_string());
    stamp("RUSTC", &rustc);
}
