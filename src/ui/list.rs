use std::io::{self, Write};

use crate::categorize::Category;
use crate::sync::RemoteItem;
use crate::util::strip_control_chars;

/// Group items by category in [`Category::ALL`] order, skipping empty groups.
///
/// Rows whose category is missing or not a known name land in `Other`.
/// Items keep their server order within a group.
pub fn group_by_category(items: &[RemoteItem]) -> Vec<(Category, Vec<&RemoteItem>)> {
    let mut groups: Vec<(Category, Vec<&RemoteItem>)> =
        Category::ALL.iter().map(|c| (*c, Vec::new())).collect();

    for item in items {
        let category = item
            .category
            .as_deref()
            .map(Category::from_name_lossy)
            .unwrap_or(Category::Other);
        if let Some((_, group)) = groups.iter_mut().find(|(c, _)| *c == category) {
            group.push(item);
        }
    }

    groups.retain(|(_, group)| !group.is_empty());
    groups
}

/// Print the list grouped by category.
pub fn render_list<W: Write>(out: &mut W, items: &[RemoteItem]) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "(list is empty)");
    }

    for (category, group) in group_by_category(items) {
        writeln!(out, "{} ({})", category, group.len())?;
        for item in group {
            let mark = if item.is_purchased { "x" } else { " " };
            let name = strip_control_chars(&item.item_name);
            match item.id {
                Some(id) => writeln!(out, "  [{mark}] {name}  #{id}")?,
                None => writeln!(out, "  [{mark}] {name}")?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(id: i64, name: &str, category: Option<&str>) -> RemoteItem {
        RemoteItem {
            id: Some(id),
            item_name: name.to_string(),
            category: category.map(str::to_string),
            ..RemoteItem::default()
        }
    }

    #[test]
    fn test_groups_follow_canonical_order() {
        let items = vec![
            item(1, "Dish soap", Some("Household")),
            item(2, "Apples", Some("Fruits")),
            item(3, "Milk", Some("Dairy")),
            item(4, "Bananas", Some("Fruits")),
        ];

        let groups = group_by_category(&items);
        let order: Vec<Category> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            order,
            vec![Category::Fruits, Category::Dairy, Category::Household]
        );
        let fruit_names: Vec<&str> = groups[0].1.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(fruit_names, vec!["Apples", "Bananas"]);
    }

    #[test]
    fn test_unknown_and_missing_categories_go_to_other() {
        let items = vec![
            item(1, "Mystery", Some("Snacks")),
            item(2, "Thing", None),
            item(3, "Bread", Some("bakery")),
        ];

        let groups = group_by_category(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Category::Bakery);
        assert_eq!(groups[1].0, Category::Other);
        assert_eq!(groups[1].1.len(), 2);
    }

    #[test]
    fn test_render_list_output() {
        let mut purchased = item(7, "Milk", Some("Dairy"));
        purchased.is_purchased = true;
        let items = vec![purchased, item(8, "\x1b[31mCarrots\x1b[0m", Some("Vegetables"))];

        let mut out = Vec::new();
        render_list(&mut out, &items).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Vegetables (1)\n  [ ] Carrots  #8\nDairy (1)\n  [x] Milk  #7\n"
        );
    }

    #[test]
    fn test_render_empty_list() {
        let mut out = Vec::new();
        render_list(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(list is empty)\n");
    }
}
