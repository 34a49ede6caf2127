//! Danger classifier (§4.3): a fixed, case-insensitive regex list over the
//! raw command string. §9 is explicit that this is a heuristic, not a
//! security boundary — the true boundary is the approval gate (§4.4).

use std::sync::LazyLock;

use regex::RegexSet;

/// Non-exhaustive pattern list, per §4.3. Each is matched case-insensitively
/// as a substring against the raw command.
const DANGEROUS_PATTERNS: &[&str] = &[
    r"rm\s+-rf",
    r"\bdd\s",
    r"\bmkfs",
    r"\bfdisk\b",
    r">\s*/dev/",
    r"\bshutdown\b",
    r"\breboot\b",
    r"\bhalt\b",
    r"\bpoweroff\b",
    r"chmod\s+777",
    r"chown\s+-r\s+\S*\s*/",
    r":\(\)\s*\{[^}]*\|[^}]*&[^}]*\}\s*;",
    r">\s*/etc/",
    r"(systemctl|service)\s+(stop|disable)\s+(ssh|sshd|networking|network-manager)",
    r"ufw\s+disable",
    r"iptables\s+-f\b",
    r"drop\s+table",
    r"truncate\b",
    r"\buserdel\b",
    r"passwd\s+root",
];

static DANGEROUS_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(DANGEROUS_PATTERNS.iter().map(|p| format!("(?i){p}")))
        .expect("danger pattern list must compile")
});

/// `DELETE FROM ... ;` without an accompanying `WHERE` clause (§4.3). The
/// `regex` crate has no lookahead, so this is checked separately from the
/// rest of the fixed-pattern set.
fn is_unqualified_delete(command: &str) -> bool {
    let lower = command.to_lowercase();
    for stmt in lower.split(';') {
        let stmt = stmt.trim();
        if stmt.starts_with("delete from") && !stmt.contains("where") {
            return true;
        }
    }
    false
}

/// `isDangerousCommand(s)`: true if `s` matches any fixed pattern (§4.3, §8).
#[must_use]
pub fn is_dangerous_command(command: &str) -> bool {
    if command.is_empty() {
        return false;
    }
    DANGEROUS_SET.is_match(command) || is_unqualified_delete(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_not_dangerous() {
        assert!(!is_dangerous_command(""));
    }

    #[test]
    fn substring_match_is_dangerous() {
        assert!(is_dangerous_command("echo rm -rf /"));
    }

    #[test]
    fn case_insensitive() {
        assert!(is_dangerous_command("RM -RF /var/log"));
    }

    #[test]
    fn dd_on_raw_device() {
        assert!(is_dangerous_command("dd if=/dev/zero of=/dev/sda"));
    }

    #[test]
    fn mkfs_is_dangerous() {
        assert!(is_dangerous_command("mkfs.ext4 /dev/sdb1"));
    }

    #[test]
    fn chmod_777_is_dangerous() {
        assert!(is_dangerous_command("chmod 777 /etc/shadow"));
    }

    #[test]
    fn fork_bomb_is_dangerous() {
        assert!(is_dangerous_command(":(){ :|:& };:"));
    }

    #[test]
    fn stop_sshd_is_dangerous() {
        assert!(is_dangerous_command("systemctl stop sshd"));
    }

    #[test]
    fn ufw_disable_is_dangerous() {
        assert!(is_dangerous_command("ufw disable"));
    }

    #[test]
    fn drop_table_is_dangerous() {
        assert!(is_dangerous_command("DROP TABLE users;"));
    }

    #[test]
    fn delete_without_where_is_dangerous() {
        assert!(is_dangerous_command("DELETE FROM users;"));
    }

    #[test]
    fn delete_with_where_is_not_flagged_by_that_rule() {
        assert!(!is_dangerous_command("DELETE FROM sessions WHERE id = 1;"));
    }

    #[test]
    fn userdel_is_dangerous() {
        assert!(is_dangerous_command("userdel -r deploy"));
    }

    #[test]
    fn passwd_root_is_dangerous() {
        assert!(is_dangerous_command("passwd root"));
    }

    #[test]
    fn benign_command_is_not_dangerous() {
        assert!(!is_dangerous_command("df -h"));
        assert!(!is_dangerous_command("ls -la /var/www"));
    }
}
