/// One other executor replica, as configured via `PEERS` (`SPEC_FULL.md` §6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peer {
    pub id: i32,
    pub host: String,
    pub port: u16,
}

impl Peer {
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses the `PEERS` environment value, a comma-separated list of
/// `id:host:port` triples. Blank entries (e.g. a trailing comma) are
/// skipped; a malformed entry is dropped rather than failing startup, since
/// a single bad peer should not prevent the replica from electing against
/// the others.
#[must_use]
pub fn parse_peers(raw: &str) -> Vec<Peer> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let id = parts.next()?.parse().ok()?;
            let host = parts.next()?.to_owned();
            let port = parts.next()?.parse().ok()?;
            Some(Peer { id, host, port })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_a_well_formed_peer_list() {
        let peers = parse_peers("1:replica-1:50054,2:replica-2:50055");
        assert_eq!(
            peers,
            vec![
                Peer { id: 1, host: "replica-1".into(), port: 50054 },
                Peer { id: 2, host: "replica-2".into(), port: 50055 },
            ]
        );
    }

    #[test]
    fn empty_string_yields_no_peers() {
        assert_eq!(parse_peers(""), vec![]);
    }

    #[test]
    fn skips_blank_entries_from_trailing_commas() {
        let peers = parse_peers("1:replica-1:50054,,");
        assert_eq!(peers.len(), 1);
    }

    #[test]
    fn skips_malformed_entries() {
        let peers = parse_peers("not-a-peer,2:replica-2:50055");
        assert_eq!(peers, vec![Peer { id: 2, host: "replica-2".into(), port: 50055 }]);
    }

    #[test]
    fn addr_joins_host_and_port() {
        let peer = Peer { id: 1, host: "localhost".into(), port: 50054 };
        assert_eq!(peer.addr(), "localhost:50054");
    }
}
