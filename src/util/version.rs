pub const APP_NAME: &str = "Listing Net Report";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD_COMMIT: Option<&str> = option_env!("BUILD_COMMIT");

/// Version string shown by `--version`, with the commit when built from git.
pub fn version_label() -> String {
    match BUILD_COMMIT {
        Some(commit) => format!("v{APP_VERSION} ({commit})"),
        None => format!("v{APP_VERSION}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_starts_with_package_version() {
        assert!(version_label().starts_with(&format!("v{APP_VERSION}")));
    }
}
