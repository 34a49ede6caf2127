//! The static, ordered tool registry (§4.3). Tool families and exact names
//! are reproduced verbatim; input schemas fill in the shape left implicit
//! elsewhere.

use serde_json::{json, Value};

use crate::schema::{ToolFamily, ToolSchema};

fn tool(
    name: &'static str,
    description: &'static str,
    input_schema: Value,
    family: ToolFamily,
    intrinsically_dangerous: bool,
) -> ToolSchema {
    ToolSchema {
        name,
        description,
        input_schema,
        family,
        intrinsically_dangerous,
    }
}

/// Returns the fixed, ordered tool list (§4.3).
#[must_use]
pub fn definitions() -> Vec<ToolSchema> {
    use ToolFamily::{Backup, Docker, Filesystem, GitHub, System, WebServer};

    vec![
        // Filesystem
        tool(
            "execute_command",
            "Execute a shell command on the remote host and return its output.",
            json!({
                "type": "object",
                "required": ["command", "explanation"],
                "properties": {
                    "command": {"type": "string", "description": "Shell command, passed verbatim"},
                    "explanation": {"type": "string", "description": "Why this command is being run"},
                    "timeout_seconds": {"type": "integer", "description": "Clamped to [1, 300]"}
                }
            }),
            Filesystem,
            false,
        ),
        tool(
            "read_file",
            "Read a remote file, optionally a line range.",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {"type": "string"},
                    "start_line": {"type": "integer"},
                    "max_lines": {"type": "integer", "description": "Default 500"}
                }
            }),
            Filesystem,
            false,
        ),
        tool(
            "write_file",
            "Overwrite (or create) a remote file with the given content.",
            json!({
                "type": "object",
                "required": ["path", "content"],
                "properties": {
                    "path": {"type": "string"},
                    "content": {"type": "string"}
                }
            }),
            Filesystem,
            false,
        ),
        tool(
            "edit_file",
            "Apply a find/replace edit to a remote file.",
            json!({
                "type": "object",
                "required": ["path", "find", "replace"],
                "properties": {
                    "path": {"type": "string"},
                    "find": {"type": "string"},
                    "replace": {"type": "string"}
                }
            }),
            Filesystem,
            false,
        ),
        tool(
            "list_directory",
            "List the contents of a remote directory.",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {"type": "string"},
                    "show_hidden": {"type": "boolean"}
                }
            }),
            Filesystem,
            false,
        ),
        // System
        tool(
            "get_system_metrics",
            "Fetch CPU/memory/disk/load metrics from the remote host.",
            json!({"type": "object", "required": [], "properties": {}}),
            System,
            false,
        ),
        tool(
            "check_service_status",
            "Check a systemd service's status.",
            json!({
                "type": "object",
                "required": ["service"],
                "properties": {"service": {"type": "string"}}
            }),
            System,
            false,
        ),
        tool(
            "get_logs",
            "Tail a log source (journald unit, or log file path).",
            json!({
                "type": "object",
                "required": ["source"],
                "properties": {
                    "source": {"type": "string"},
                    "lines": {"type": "integer", "description": "Default 200"}
                }
            }),
            System,
            false,
        ),
        tool(
            "package_manage",
            "Install, remove, or upgrade system packages.",
            json!({
                "type": "object",
                "required": ["action", "package"],
                "properties": {
                    "action": {"type": "string", "enum": ["install", "remove", "upgrade"]},
                    "package": {"type": "string"}
                }
            }),
            System,
            true,
        ),
        tool(
            "process_manage",
            "Inspect or signal a remote process.",
            json!({
                "type": "object",
                "required": ["action"],
                "properties": {
                    "action": {"type": "string", "enum": ["list", "kill", "restart"]},
                    "pid": {"type": "integer"},
                    "name": {"type": "string"}
                }
            }),
            System,
            true,
        ),
        tool(
            "cron_manage",
            "List, add, or remove a crontab entry.",
            json!({
                "type": "object",
                "required": ["action"],
                "properties": {
                    "action": {"type": "string", "enum": ["list", "add", "remove"]},
                    "schedule": {"type": "string"},
                    "command": {"type": "string"}
                }
            }),
            System,
            true,
        ),
        tool(
            "network_diagnose",
            "Run a network diagnostic (ping, traceroute, port check, DNS lookup).",
            json!({
                "type": "object",
                "required": ["kind", "target"],
                "properties": {
                    "kind": {"type": "string", "enum": ["ping", "traceroute", "port_check", "dns_lookup"]},
                    "target": {"type": "string"}
                }
            }),
            System,
            false,
        ),
        tool(
            "security_audit",
            "Run a read-only security audit (open ports, failed logins, world-writable files).",
            json!({"type": "object", "required": [], "properties": {}}),
            System,
            false,
        ),
        // Docker
        tool(
            "docker_list",
            "List containers, images, volumes, or networks.",
            json!({
                "type": "object",
                "required": ["resource"],
                "properties": {
                    "resource": {"type": "string", "enum": ["containers", "images", "volumes", "networks"]}
                }
            }),
            Docker,
            false,
        ),
        tool(
            "docker_manage",
            "Start, stop, restart, or remove a container.",
            json!({
                "type": "object",
                "required": ["action", "container"],
                "properties": {
                    "action": {"type": "string", "enum": ["start", "stop", "restart", "remove"]},
                    "container": {"type": "string"}
                }
            }),
            Docker,
            true,
        ),
        tool(
            "docker_compose",
            "Run a docker-compose subcommand against a project directory.",
            json!({
                "type": "object",
                "required": ["project_dir", "action"],
                "properties": {
                    "project_dir": {"type": "string"},
                    "action": {"type": "string", "enum": ["up", "down", "restart", "pull", "ps"]}
                }
            }),
            Docker,
            true,
        ),
        // Web/TLS
        tool(
            "nginx_manage",
            "Reload, test, or modify an nginx site configuration.",
            json!({
                "type": "object",
                "required": ["action"],
                "properties": {
                    "action": {"type": "string", "enum": ["reload", "test", "enable_site", "disable_site"]},
                    "site": {"type": "string"}
                }
            }),
            WebServer,
            true,
        ),
        tool(
            "ssl_certificate",
            "Obtain, renew, or revoke a TLS certificate via certbot.",
            json!({
                "type": "object",
                "required": ["action", "domain"],
                "properties": {
                    "action": {"type": "string", "enum": ["obtain", "renew", "revoke"]},
                    "domain": {"type": "string"}
                }
            }),
            WebServer,
            true,
        ),
        tool(
            "database_query",
            "Run a SQL statement against a configured database. Mutating \
             statements (INSERT/UPDATE/DELETE/DDL) always require approval.",
            json!({
                "type": "object",
                "required": ["connection", "query"],
                "properties": {
                    "connection": {"type": "string"},
                    "query": {"type": "string"}
                }
            }),
            WebServer,
            false,
        ),
        // Backup
        tool(
            "backup_create",
            "Create a new BackupConfig for a restic repository. Persists the \
             config (with secrets vault-encrypted); does not run a remote command.",
            json!({
                "type": "object",
                "required": ["name", "repository_type", "repository_path", "password"],
                "properties": {
                    "name": {"type": "string"},
                    "repository_type": {"type": "string", "enum": ["local", "s3", "sftp", "b2"]},
                    "repository_path": {"type": "string"},
                    "password": {"type": "string", "description": "Restic repository password"},
                    "access_key_id": {"type": "string", "description": "Required for s3/b2 repositories"},
                    "secret_access_key": {"type": "string", "description": "Required for s3/b2 repositories"},
                    "endpoint": {"type": "string"},
                    "region": {"type": "string"},
                    "include_paths": {"type": "array"},
                    "exclude_patterns": {"type": "array"}
                }
            }),
            Backup,
            true,
        ),
        tool(
            "restic_init",
            "Initialize a restic repository.",
            json!({"type": "object", "required": ["backup_config_id"], "properties": {"backup_config_id": {"type": "string"}}}),
            Backup,
            true,
        ),
        tool(
            "restic_backup",
            "Run a restic backup for a BackupConfig's includePaths.",
            json!({"type": "object", "required": ["backup_config_id"], "properties": {"backup_config_id": {"type": "string"}}}),
            Backup,
            true,
        ),
        tool(
            "restic_list",
            "List snapshots in a restic repository.",
            json!({"type": "object", "required": ["backup_config_id"], "properties": {"backup_config_id": {"type": "string"}}}),
            Backup,
            false,
        ),
        tool(
            "restic_restore",
            "Restore a restic snapshot to a target path.",
            json!({
                "type": "object",
                "required": ["backup_config_id", "snapshot_id", "target_path"],
                "properties": {
                    "backup_config_id": {"type": "string"},
                    "snapshot_id": {"type": "string"},
                    "target_path": {"type": "string"}
                }
            }),
            Backup,
            true,
        ),
        tool(
            "restic_verify",
            "Verify the integrity of a restic repository.",
            json!({"type": "object", "required": ["backup_config_id"], "properties": {"backup_config_id": {"type": "string"}}}),
            Backup,
            false,
        ),
        tool(
            "restic_prune",
            "Prune old snapshots per a BackupConfig's retention policy.",
            json!({"type": "object", "required": ["backup_config_id"], "properties": {"backup_config_id": {"type": "string"}}}),
            Backup,
            true,
        ),
        tool(
            "restic_stats",
            "Report repository size statistics.",
            json!({"type": "object", "required": ["backup_config_id"], "properties": {"backup_config_id": {"type": "string"}}}),
            Backup,
            false,
        ),
        tool(
            "restic_diff",
            "Diff two restic snapshots.",
            json!({
                "type": "object",
                "required": ["backup_config_id", "snapshot_a", "snapshot_b"],
                "properties": {
                    "backup_config_id": {"type": "string"},
                    "snapshot_a": {"type": "string"},
                    "snapshot_b": {"type": "string"}
                }
            }),
            Backup,
            false,
        ),
        tool(
            "restic_mount",
            "Mount a restic repository as a FUSE filesystem.",
            json!({
                "type": "object",
                "required": ["backup_config_id", "mount_path"],
                "properties": {
                    "backup_config_id": {"type": "string"},
                    "mount_path": {"type": "string"}
                }
            }),
            Backup,
            true,
        ),
        // GitHub
        tool(
            "github_search_repos",
            "Search GitHub repositories.",
            json!({"type": "object", "required": ["query"], "properties": {"query": {"type": "string"}}}),
            GitHub,
            false,
        ),
        tool(
            "github_get_repo",
            "Fetch a GitHub repository's metadata.",
            json!({"type": "object", "required": ["owner", "repo"], "properties": {"owner": {"type": "string"}, "repo": {"type": "string"}}}),
            GitHub,
            false,
        ),
        tool(
            "github_list_contents",
            "List the contents of a path in a GitHub repository.",
            json!({
                "type": "object",
                "required": ["owner", "repo", "path"],
                "properties": {"owner": {"type": "string"}, "repo": {"type": "string"}, "path": {"type": "string"}}
            }),
            GitHub,
            false,
        ),
        tool(
            "github_get_file",
            "Fetch a file's content from a GitHub repository.",
            json!({
                "type": "object",
                "required": ["owner", "repo", "path"],
                "properties": {"owner": {"type": "string"}, "repo": {"type": "string"}, "path": {"type": "string"}, "ref": {"type": "string"}}
            }),
            GitHub,
            false,
        ),
        tool(
            "github_search_code",
            "Search code across GitHub.",
            json!({"type": "object", "required": ["query"], "properties": {"query": {"type": "string"}}}),
            GitHub,
            false,
        ),
        tool(
            "github_list_commits",
            "List commits on a branch.",
            json!({
                "type": "object",
                "required": ["owner", "repo"],
                "properties": {"owner": {"type": "string"}, "repo": {"type": "string"}, "branch": {"type": "string"}}
            }),
            GitHub,
            false,
        ),
        tool(
            "github_list_branches",
            "List branches of a repository.",
            json!({"type": "object", "required": ["owner", "repo"], "properties": {"owner": {"type": "string"}, "repo": {"type": "string"}}}),
            GitHub,
            false,
        ),
        tool(
            "github_list_issues",
            "List issues on a repository.",
            json!({
                "type": "object",
                "required": ["owner", "repo"],
                "properties": {"owner": {"type": "string"}, "repo": {"type": "string"}, "state": {"type": "string", "enum": ["open", "closed", "all"]}}
            }),
            GitHub,
            false,
        ),
        tool(
            "github_create_issue",
            "Create a new issue on a repository.",
            json!({
                "type": "object",
                "required": ["owner", "repo", "title"],
                "properties": {"owner": {"type": "string"}, "repo": {"type": "string"}, "title": {"type": "string"}, "body": {"type": "string"}}
            }),
            GitHub,
            true,
        ),
        tool(
            "github_list_pull_requests",
            "List pull requests on a repository.",
            json!({
                "type": "object",
                "required": ["owner", "repo"],
                "properties": {"owner": {"type": "string"}, "repo": {"type": "string"}, "state": {"type": "string", "enum": ["open", "closed", "all"]}}
            }),
            GitHub,
            false,
        ),
        tool(
            "github_create_file",
            "Create or update a file in a repository (PUT contents API).",
            json!({
                "type": "object",
                "required": ["owner", "repo", "path", "content", "message"],
                "properties": {
                    "owner": {"type": "string"},
                    "repo": {"type": "string"},
                    "path": {"type": "string"},
                    "content": {"type": "string"},
                    "message": {"type": "string"},
                    "branch": {"type": "string"}
                }
            }),
            GitHub,
            true,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_family_is_represented() {
        let defs = definitions();
        for family in [
            ToolFamily::Filesystem,
            ToolFamily::System,
            ToolFamily::Docker,
            ToolFamily::WebServer,
            ToolFamily::Backup,
            ToolFamily::GitHub,
        ] {
            assert!(defs.iter().any(|t| t.family == family), "{family:?} missing");
        }
    }

    #[test]
    fn names_are_unique() {
        let defs = definitions();
        let mut names: Vec<&str> = defs.iter().map(|t| t.name).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
