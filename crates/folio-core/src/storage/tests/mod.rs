// Storage system test module
#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod payload_tests;

#[cfg(test)]
mod tests {
    use crate::storage::handle::{CollisionPolicy, FileHandle, FolderHandle, Snapshot};
    use crate::storage::path::LogicalPath;

    fn lp(s: &str) -> LogicalPath {
        LogicalPath::parse(s).expect("valid test path")
    }

    #[test]
    fn test_collision_policy_default() {
        assert_eq!(CollisionPolicy::default(), CollisionPolicy::OpenIfExists);
    }

    #[test]
    fn test_handle_names_and_display() {
        let root = FolderHandle::root();
        assert!(root.is_root());
        assert_eq!(root.to_string(), "/");

        let folder = FolderHandle::new(lp("docs/notes"));
        assert_eq!(folder.name(), "notes");
        assert_eq!(folder.to_string(), "/docs/notes");

        let file = FileHandle::new(lp("docs/notes/a.txt"));
        assert_eq!(file.name(), "a.txt");
        assert_eq!(file.parent(), folder);
    }

    #[test]
    fn test_snapshot_is_exact_size_and_single_pass() {
        let mut snapshot = Snapshot::new(vec![1, 2, 3]);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.next(), Some(1));
        assert_eq!(snapshot.len(), 2);
        let rest: Vec<_> = snapshot.by_ref().collect();
        assert_eq!(rest, vec![2, 3]);
        assert_eq!(snapshot.next(), None);
    }
}
