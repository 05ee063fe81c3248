// Cgroup record parsing and container classification.
//
// Record lines look like `hierarchy-ID:controller-list:cgroup-path`, e.g.
//   12:memory:/docker/3f2a...            (cgroupfs driver)
//   0::/system.slice/docker-3f2a....scope (systemd driver, unified)

/// One hierarchy line of a process's cgroup record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupMembership {
    pub hierarchy_id: String,
    /// Controller list, possibly empty or comma-joined.
    pub subsystem: String,
    /// Always starts with `/`; `/` alone means root.
    pub path: String,
}

/// Picks the membership used for classification: the first unified (`0`)
/// hierarchy line, otherwise the last usable line. `None` when no line is
/// usable.
pub(crate) fn select_membership(content: &str) -> Option<CgroupMembership> {
    let mut chosen = None;
    for line in content.lines() {
        let Some(membership) = parse_line(line) else {
            continue;
        };
        let unified = membership.hierarchy_id == "0";
        chosen = Some(membership);
        if unified {
            break;
        }
    }
    chosen
}

fn parse_line(line: &str) -> Option<CgroupMembership> {
    let mut parts = line.trim_end().splitn(3, ':');
    let hierarchy_id = parts.next()?;
    let subsystem = parts.next()?;
    let path = parts.next()?;
    if !path.starts_with('/') {
        return None;
    }
    Some(CgroupMembership {
        hierarchy_id: hierarchy_id.to_string(),
        subsystem: subsystem.to_string(),
        path: path.to_string(),
    })
}

/// Extracts a Docker container id from a cgroup path, or `None` for
/// host/system-owned processes. Short paths are host-owned, never an error.
pub fn container_id_from_path(path: &str) -> Option<String> {
    let segments: Vec<&str> = path.split('/').collect();

    if segments.get(1) == Some(&"docker") {
        return segments
            .get(2)
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string());
    }

    if path == "/" {
        return None;
    }

    let scope = segments.get(2)?;
    let mut parts = scope.split('-');
    if parts.next() != Some("docker") {
        return None;
    }
    let id = parts.next()?;
    let id = id.strip_suffix(".scope").unwrap_or(id);
    (!id.is_empty()).then(|| id.to_string())
}
