//! Builds the literal shell command string for every SSH-family tool
//! (§4.4 step 3 relies on having this string *before* execution, so the
//! danger classifier can inspect it). No shell quoting is attempted beyond
//! `shell_escape`-style single-quoting of whole arguments — callers'
//! content is otherwise passed through verbatim, matching the SSH
//! Executor's own "no quoting is attempted on caller input" contract
//! (§4.2).

use serde_json::Value;

fn s(input: &Value, field: &str) -> String {
    input.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn sq(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Returns the shell command for `tool_name` given its validated `input`,
/// or `None` if the tool isn't an SSH-family tool (i.e. it's GitHub, which
/// goes over HTTPS instead).
#[must_use]
pub fn build_command(tool_name: &str, input: &Value) -> Option<String> {
    Some(match tool_name {
        "execute_command" => s(input, "command"),
        "read_file" => {
            let path = s(input, "path");
            let start = input.get("start_line").and_then(Value::as_u64);
            let max_lines = input.get("max_lines").and_then(Value::as_u64).unwrap_or(500);
            match start {
                Some(start) => format!("tail -n +{start} {} | head -n {max_lines}", sq(&path)),
                None => format!("head -n {max_lines} {}", sq(&path)),
            }
        }
        "write_file" => {
            let path = s(input, "path");
            let content = s(input, "content");
            format!("cat > {} <<'VPS_AGENT_EOF'\n{content}\nVPS_AGENT_EOF", sq(&path))
        }
        "edit_file" => {
            let path = s(input, "path");
            let find = s(input, "find");
            let replace = s(input, "replace");
            format!(
                "sed -i {} {}",
                sq(&format!("s/{}/{}/g", sed_escape(&find), sed_escape(&replace))),
                sq(&path)
            )
        }
        "list_directory" => {
            let path = s(input, "path");
            let show_hidden = input.get("show_hidden").and_then(Value::as_bool).unwrap_or(false);
            format!("ls -l{} {}", if show_hidden { "a" } else { "" }, sq(&path))
        }
        "get_system_metrics" => {
            "echo '--cpu--'; uptime; echo '--mem--'; free -h; echo '--disk--'; df -h".to_string()
        }
        "check_service_status" => format!("systemctl status {} --no-pager", sq(&s(input, "service"))),
        "get_logs" => {
            let source = s(input, "source");
            let lines = input.get("lines").and_then(Value::as_u64).unwrap_or(200);
            if source.starts_with('/') {
                format!("tail -n {lines} {}", sq(&source))
            } else {
                format!("journalctl -u {} -n {lines} --no-pager", sq(&source))
            }
        }
        "package_manage" => {
            let action = s(input, "action");
            let package = s(input, "package");
            match action.as_str() {
                "install" => format!("apt-get install -y {}", sq(&package)),
                "remove" => format!("apt-get remove -y {}", sq(&package)),
                "upgrade" => format!("apt-get install --only-upgrade -y {}", sq(&package)),
                _ => return None,
            }
        }
        "process_manage" => {
            let action = s(input, "action");
            match action.as_str() {
                "list" => "ps aux".to_string(),
                "kill" => format!("kill {}", input.get("pid").and_then(Value::as_u64).unwrap_or(0)),
                "restart" => format!("systemctl restart {}", sq(&s(input, "name"))),
                _ => return None,
            }
        }
        "cron_manage" => {
            let action = s(input, "action");
            match action.as_str() {
                "list" => "crontab -l".to_string(),
                "add" => format!(
                    "(crontab -l 2>/dev/null; echo {} {}) | crontab -",
                    sq(&s(input, "schedule")),
                    sq(&s(input, "command"))
                ),
                "remove" => format!(
                    "crontab -l | grep -vF {} | crontab -",
                    sq(&s(input, "command"))
                ),
                _ => return None,
            }
        }
        "network_diagnose" => {
            let target = s(input, "target");
            match s(input, "kind").as_str() {
                "ping" => format!("ping -c 4 {}", sq(&target)),
                "traceroute" => format!("traceroute {}", sq(&target)),
                "port_check" => format!("nc -zv {} 2>&1", sq(&target)),
                "dns_lookup" => format!("dig {} +short", sq(&target)),
                _ => return None,
            }
        }
        "security_audit" => {
            "echo '--open ports--'; ss -tulpn; echo '--failed logins--'; \
             lastb -n 20 2>/dev/null || true; echo '--world writable--'; \
             find / -xdev -perm -o+w -type f 2>/dev/null | head -n 50"
                .to_string()
        }
        "docker_list" => format!("docker {} --format '{{{{json .}}}}'", docker_list_subcommand(input)),
        "docker_manage" => {
            let action = s(input, "action");
            let container = sq(&s(input, "container"));
            match action.as_str() {
                "start" => format!("docker start {container}"),
                "stop" => format!("docker stop {container}"),
                "restart" => format!("docker restart {container}"),
                "remove" => format!("docker rm -f {container}"),
                _ => return None,
            }
        }
        "docker_compose" => {
            let project_dir = sq(&s(input, "project_dir"));
            let action = s(input, "action");
            format!("docker compose --project-directory {project_dir} {action}")
        }
        "nginx_manage" => match s(input, "action").as_str() {
            "reload" => "nginx -s reload".to_string(),
            "test" => "nginx -t".to_string(),
            "enable_site" => format!(
                "ln -sf /etc/nginx/sites-available/{0} /etc/nginx/sites-enabled/{0} && nginx -s reload",
                s(input, "site")
            ),
            "disable_site" => format!(
                "rm -f /etc/nginx/sites-enabled/{} && nginx -s reload",
                s(input, "site")
            ),
            _ => return None,
        },
        "ssl_certificate" => {
            let domain = sq(&s(input, "domain"));
            match s(input, "action").as_str() {
                "obtain" => format!("certbot certonly --nginx -d {domain} --non-interactive --agree-tos"),
                "renew" => format!("certbot renew --cert-name {domain}"),
                "revoke" => format!("certbot revoke --cert-name {domain} --non-interactive"),
                _ => return None,
            }
        }
        "database_query" => format!("psql {} -c {}", sq(&s(input, "connection")), sq(&s(input, "query"))),
        "restic_init" => restic_base(input, "init"),
        "restic_backup" => restic_base(input, "backup"),
        "restic_list" => format!("{} snapshots --json", restic_base(input, "")),
        "restic_restore" => format!(
            "{} restore {} --target {}",
            restic_base(input, ""),
            sq(&s(input, "snapshot_id")),
            sq(&s(input, "target_path"))
        ),
        "restic_verify" => format!("{} check", restic_base(input, "")),
        "restic_prune" => format!("{} forget --prune", restic_base(input, "")),
        "restic_stats" => format!("{} stats --json", restic_base(input, "")),
        "restic_diff" => format!(
            "{} diff {} {}",
            restic_base(input, ""),
            sq(&s(input, "snapshot_a")),
            sq(&s(input, "snapshot_b"))
        ),
        "restic_mount" => format!("{} mount {}", restic_base(input, ""), sq(&s(input, "mount_path"))),
        _ => return None,
    })
}

fn docker_list_subcommand(input: &Value) -> &'static str {
    match s(input, "resource").as_str() {
        "images" => "image ls",
        "volumes" => "volume ls",
        "networks" => "network ls",
        _ => "ps -a",
    }
}

/// Shared prefix for `restic_*` tools: the repository is identified by the
/// BackupConfig id, resolved to `--repo`/`--password-file` flags upstream
/// of this module (the dispatcher substitutes them once it has decrypted
/// the config). Here we build just the subcommand tail.
fn restic_base(input: &Value, subcommand: &str) -> String {
    let config_id = sq(&s(input, "backup_config_id"));
    if subcommand.is_empty() {
        format!("restic --json --repository-file /run/vps-agent/{config_id}.repo")
    } else {
        format!(
            "restic --json --repository-file /run/vps-agent/{config_id}.repo {subcommand}"
        )
    }
}

fn sed_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('/', "\\/").replace('&', "\\&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn execute_command_passes_through_verbatim() {
        let cmd = build_command("execute_command", &json!({"command": "df -h", "explanation": "check disk"}));
        assert_eq!(cmd, Some("df -h".to_string()));
    }

    #[test]
    fn read_file_defaults_to_500_lines() {
        let cmd = build_command("read_file", &json!({"path": "/var/log/syslog"})).unwrap();
        assert!(cmd.contains("head -n 500"));
    }

    #[test]
    fn package_manage_install_builds_apt_command() {
        let cmd = build_command("package_manage", &json!({"action": "install", "package": "nginx"})).unwrap();
        assert_eq!(cmd, "apt-get install -y 'nginx'");
    }

    #[test]
    fn github_tool_returns_none() {
        assert_eq!(build_command("github_get_repo", &json!({})), None);
    }

    #[test]
    fn single_quote_in_argument_is_escaped() {
        let cmd = build_command(
            "package_manage",
            &json!({"action": "install", "package": "it's-a-package"}),
        )
        .unwrap();
        assert!(cmd.contains("it'\\''s-a-package"));
    }
}
