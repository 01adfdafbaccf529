//! Build identification captured by `build.rs`

/// `--version` string: package version plus git revision
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SMASHPASS_GIT_REV"),
    ")"
);

pub const GIT_REV: &str = env!("SMASHPASS_GIT_REV");
pub const BUILD_DATE: &str = env!("SMASHPASS_BUILD_DATE");
pub const BUILD_PROFILE: &str = env!("SMASHPASS_BUILD_PROFILE");

/// One-line description for the startup log
pub fn describe() -> String {
    format!(
        "smashpass {} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        GIT_REV,
        BUILD_DATE,
        BUILD_PROFILE
    )
}
