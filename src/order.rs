//! Table fill order derived from the foreign key graph.
//!
//! A table is filled once every table it references is filled. Self
//! references are ignored. When only cycles remain, the table on a cycle with
//! the fewest unfilled dependencies goes next. Its deferred foreign keys draw
//! from the rows that already exist in the other tables.

use fill_core::CustomizedTable;
use std::collections::HashMap;
use tracing::warn;

/// Order in which to fill `tables`, as indexes into the slice.
///
/// References to tables outside the slice are ignored. Ties are broken by
/// position in the slice.
pub fn fill_order(tables: &[CustomizedTable]) -> Vec<usize> {
    let index: HashMap<&str, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.as_str(), i))
        .collect();
    let dependencies: Vec<Vec<usize>> = tables
        .iter()
        .enumerate()
        .map(|(i, table)| {
            let mut deps: Vec<usize> = table
                .referenced_tables
                .iter()
                .filter_map(|r| index.get(r.as_str()).copied())
                .filter(|&d| d != i)
                .collect();
            deps.sort_unstable();
            deps.dedup();
            deps
        })
        .collect();

    let mut scheduled = vec![false; tables.len()];
    let mut order = Vec::with_capacity(tables.len());
    let unfilled =
        |i: usize, scheduled: &[bool]| dependencies[i].iter().filter(|&&d| !scheduled[d]).count();

    while order.len() < tables.len() {
        let ready = (0..tables.len()).find(|&i| !scheduled[i] && unfilled(i, &scheduled) == 0);

        let next = match ready {
            Some(i) => i,
            None => {
                let Some(i) = (0..tables.len())
                    .filter(|&i| !scheduled[i] && on_cycle(i, &dependencies, &scheduled))
                    .min_by_key(|&i| (unfilled(i, &scheduled), i))
                else {
                    break;
                };
                let deferred: Vec<&str> = dependencies[i]
                    .iter()
                    .filter(|&&d| !scheduled[d])
                    .map(|&d| tables[d].name.as_str())
                    .collect();
                warn!(
                    "Foreign key cycle: filling {} before {}, existing rows will be referenced",
                    tables[i].name,
                    deferred.join(", ")
                );
                i
            }
        };

        scheduled[next] = true;
        order.push(next);
    }
    order
}

/// Whether `start` reaches itself through unscheduled tables.
fn on_cycle(start: usize, dependencies: &[Vec<usize>], scheduled: &[bool]) -> bool {
    let mut visited = vec![false; dependencies.len()];
    let mut stack: Vec<usize> = dependencies[start].clone();
    while let Some(node) = stack.pop() {
        if node == start {
            return true;
        }
        if scheduled[node] || visited[node] {
            continue;
        }
        visited[node] = true;
        stack.extend(dependencies[node].iter().copied());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, referenced: &[&str]) -> CustomizedTable {
        CustomizedTable {
            name: name.to_string(),
            columns: Vec::new(),
            referenced_tables: referenced.iter().map(|s| s.to_string()).collect(),
            max_lines: None,
            add_lines: None,
            delta_rows: 1,
            before: Vec::new(),
            after: Vec::new(),
            disable_triggers: false,
            template: None,
        }
    }

    fn names(tables: &[CustomizedTable]) -> Vec<&str> {
        fill_order(tables)
            .into_iter()
            .map(|i| tables[i].name.as_str())
            .collect()
    }

    #[test]
    fn test_dependencies_filled_first() {
        let tables = vec![
            table("order_items", &["orders", "products"]),
            table("orders", &["customers"]),
            table("products", &[]),
            table("customers", &[]),
        ];
        assert_eq!(
            names(&tables),
            vec!["products", "customers", "orders", "order_items"]
        );
    }

    #[test]
    fn test_self_reference_ignored() {
        let tables = vec![
            table("employees", &["employees", "departments"]),
            table("departments", &[]),
        ];
        assert_eq!(names(&tables), vec!["departments", "employees"]);
    }

    #[test]
    fn test_cycle_is_scheduled() {
        // a <-> b, c depends on a
        let tables = vec![
            table("c", &["a"]),
            table("a", &["b"]),
            table("b", &["a"]),
            table("d", &[]),
        ];
        assert_eq!(names(&tables), vec!["d", "a", "c", "b"]);
    }

    #[test]
    fn test_cycle_prefers_fewest_unfilled_dependencies() {
        let tables = vec![
            table("x", &["y", "z"]),
            table("y", &["x"]),
            table("z", &["x"]),
        ];
        assert_eq!(names(&tables), vec!["y", "x", "z"]);
    }

    #[test]
    fn test_unknown_reference_ignored() {
        let tables = vec![table("orders", &["ignored_table"])];
        assert_eq!(names(&tables), vec!["orders"]);
    }
}
