//! CLI command builders for tests

use assert_cmd::Command;

/// Command for `bin_name` with `RUST_LOG=error` and no inherited overrides
///
/// # Example
///
/// ```rust,no_run
/// use kaku_test_helpers::cli::command_for;
///
/// command_for("kakuyomu-mcp").arg("--help").assert().success();
/// ```
#[allow(deprecated)]
pub fn command_for(bin_name: &str) -> Command {
    let mut cmd = Command::cargo_bin(bin_name)
        .unwrap_or_else(|_| panic!("Failed to find {} binary", bin_name));
    cmd.env("RUST_LOG", "error");
    cmd.env_remove("HOST");
    cmd.env_remove("PORT");
    cmd.env_remove("KAKUYOMU_BASE_URL");
    cmd
}

/// The `kaku` terminal binary
pub fn kaku_command() -> Command {
    command_for("kaku")
}

/// The `kakuyomu-mcp` server binary
pub fn mcp_command() -> Command {
    command_for("kakuyomu-mcp")
}
