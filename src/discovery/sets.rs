use std::collections::HashSet;

/// Members of `primary` that also appear in `secondary`, in `primary` order
pub fn intersect(primary: &[String], secondary: &[String]) -> Vec<String> {
    let keep: HashSet<&str> = secondary.iter().map(String::as_str).collect();
    primary
        .iter()
        .filter(|symbol| keep.contains(symbol.as_str()))
        .cloned()
        .collect()
}

/// Members of `list` not present in `excluded`, order preserved
pub fn exclude(list: &[String], excluded: &[String]) -> Vec<String> {
    let drop: HashSet<&str> = excluded.iter().map(String::as_str).collect();
    list.iter()
        .filter(|symbol| !drop.contains(symbol.as_str()))
        .cloned()
        .collect()
}

/// Members of `primary` followed by members of `secondary` not already listed
pub fn union(primary: &[String], secondary: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    primary
        .iter()
        .chain(secondary.iter())
        .filter(|symbol| seen.insert(symbol.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_intersect_keeps_primary_order() {
        assert_eq!(intersect(&list(&["A", "B", "C"]), &list(&["C", "A"])), vec!["A", "C"]);
        assert!(intersect(&list(&["A"]), &[]).is_empty());
    }

    #[test]
    fn test_exclude() {
        assert_eq!(exclude(&list(&["A", "B", "C"]), &list(&["B"])), vec!["A", "C"]);
        assert_eq!(exclude(&list(&["A"]), &[]), vec!["A"]);
    }

    #[test]
    fn test_union_deduplicates() {
        assert_eq!(
            union(&list(&["A", "B"]), &list(&["B", "C", "A"])),
            vec!["A", "B", "C"]
        );
    }
}
