use crate::components::SelectOption;

/// Ordered option list, unique by `value`. The first occurrence of a value
/// wins, so insertion order is display order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SuggestionList {
    options: Vec<SelectOption>,
}

impl SuggestionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// `lead` followed by `rest`, deduplicated by value.
    pub fn merged<'a>(
        lead: impl IntoIterator<Item = &'a SelectOption>,
        rest: impl IntoIterator<Item = &'a SelectOption>,
    ) -> Self {
        lead.into_iter().chain(rest).cloned().collect()
    }

    /// Appends `option` unless its value is already listed.
    pub fn push(&mut self, option: SelectOption) -> bool {
        if self.contains_value(&option.value) {
            return false;
        }
        self.options.push(option);
        true
    }

    /// Moves `option` to the front, replacing any entry with the same value.
    pub fn prepend(&mut self, option: SelectOption) {
        self.options.retain(|existing| existing.value != option.value);
        self.options.insert(0, option);
    }

    pub fn retain_values(&mut self, values: &[String]) {
        self.options
            .retain(|option| values.iter().any(|value| *value == option.value));
    }

    pub fn contains_value(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    pub fn values(&self) -> Vec<String> {
        self.options.iter().map(|option| option.value.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn as_slice(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn into_vec(self) -> Vec<SelectOption> {
        self.options
    }
}

impl FromIterator<SelectOption> for SuggestionList {
    fn from_iter<I: IntoIterator<Item = SelectOption>>(iter: I) -> Self {
        let mut list = Self::new();
        for option in iter {
            list.push(option);
        }
        list
    }
}

impl<'a> IntoIterator for &'a SuggestionList {
    type Item = &'a SelectOption;
    type IntoIter = std::slice::Iter<'a, SelectOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(value: &str, text: &str) -> SelectOption {
        SelectOption::new(value, text)
    }

    #[test]
    fn merge_keeps_lead_entries_first_and_drops_duplicates() {
        let selected = vec![option("2", "Chemistry")];
        let fetched = vec![option("1", "Physics"), option("2", "Chemistry (renamed)")];

        let merged = SuggestionList::merged(&selected, &fetched);

        assert_eq!(merged.values(), vec!["2", "1"]);
        assert_eq!(merged.as_slice()[0].text, "Chemistry");
    }

    #[test]
    fn pushing_a_present_value_is_a_no_op() {
        let mut list: SuggestionList = vec![option("1", "Physics")].into_iter().collect();
        assert!(!list.push(option("1", "Physics again")));
        assert_eq!(list.len(), 1);
        assert!(list.push(option("3", "Biology")));
        assert_eq!(list.values(), vec!["1", "3"]);
    }

    #[test]
    fn prepend_moves_existing_value_to_front() {
        let mut list: SuggestionList = vec![option("1", "Physics"), option("2", "Chemistry")]
            .into_iter()
            .collect();
        list.prepend(option("2", "Chemistry"));
        assert_eq!(list.values(), vec!["2", "1"]);
    }

    #[test]
    fn retain_values_keeps_list_order() {
        let mut list: SuggestionList = vec![
            option("1", "Physics"),
            option("2", "Chemistry"),
            option("3", "Biology"),
        ]
        .into_iter()
        .collect();
        list.retain_values(&["3".to_string(), "1".to_string()]);
        assert_eq!(list.values(), vec!["1", "3"]);
    }
}
