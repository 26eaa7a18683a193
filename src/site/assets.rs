//! Static viewer files, embedded at compile time.

/// `(file name, contents)` written to the root of the output directory.
pub const STATIC_ASSETS: [(&str, &str); 4] = [
    ("index.html", include_str!("assets/index.html")),
    ("chat.html", include_str!("assets/chat.html")),
    ("styles.css", include_str!("assets/styles.css")),
    ("app.js", include_str!("assets/app.js")),
];
