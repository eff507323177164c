//! Clarification questions derived from an analysis's required items.

use tracing::warn;

use bidiq_shared::{
    ClarificationQuestion, DEFAULT_FORMAT, DEFAULT_PAGE, DEFAULT_REQUIREMENTS, ItemType,
    RequiredItem, Section,
};

/// Build one question per usable item, sorted by section priority.
///
/// Items whose name is empty once leading and trailing non-alphanumeric
/// characters are trimmed are skipped; the skip count is logged.
pub fn generate_clarification_questions(items: &[RequiredItem]) -> Vec<ClarificationQuestion> {
    let mut questions: Vec<ClarificationQuestion> =
        items.iter().filter_map(question_for).collect();

    let skipped = items.len() - questions.len();
    if skipped > 0 {
        warn!(skipped, "required items without a usable name produced no question");
    }

    // Stable: items keep document order within a section.
    questions.sort_by_key(|q| q.section);
    questions
}

fn question_for(item: &RequiredItem) -> Option<ClarificationQuestion> {
    let name = clean_name(&item.item);
    if name.is_empty() {
        return None;
    }

    let mut question = match item.item_type {
        ItemType::Form => format!("Please complete and attach the {name}"),
        ItemType::Document => format!("Please provide a copy of the {name}"),
        ItemType::Information => format!("Please provide the following information: {name}"),
    };

    let page = item.page.trim();
    if !page.is_empty() && page != DEFAULT_PAGE {
        question.push_str(&format!(" (see page {page})"));
    }
    question.push('.');

    let requirements = item.requirements.trim();
    if !requirements.is_empty() && requirements != DEFAULT_REQUIREMENTS {
        question.push_str(&format!(" Requirements: {requirements}"));
    }

    let format = item.format.trim();
    if !format.is_empty() && format != DEFAULT_FORMAT {
        question.push_str(&format!(" Format: {format}"));
    }

    Some(ClarificationQuestion {
        question,
        section: section_for(item),
        importance: if item.is_required { "Required" } else { "Optional" }.into(),
        format: item.format.clone(),
    })
}

fn section_for(item: &RequiredItem) -> Section {
    if !item.is_required {
        return Section::General;
    }
    match item.item_type {
        ItemType::Form => Section::RequiredForms,
        ItemType::Document => Section::RequiredDocuments,
        ItemType::Information => Section::RequiredInformation,
    }
}

fn clean_name(raw: &str) -> &str {
    raw.trim_matches(|c: char| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn questions_ordered_forms_documents_information() {
        let items = vec![
            RequiredItem::new("Equipment list", ItemType::Information),
            RequiredItem::new("Bid Form B-1", ItemType::Form),
            RequiredItem::new("Insurance certificate", ItemType::Document),
        ];

        let questions = generate_clarification_questions(&items);
        let sections: Vec<Section> = questions.iter().map(|q| q.section).collect();
        assert_eq!(
            sections,
            vec![
                Section::RequiredForms,
                Section::RequiredDocuments,
                Section::RequiredInformation,
            ]
        );
        assert_eq!(questions[0].question, "Please complete and attach the Bid Form B-1.");
        assert_eq!(
            questions[1].question,
            "Please provide a copy of the Insurance certificate."
        );
        assert_eq!(
            questions[2].question,
            "Please provide the following information: Equipment list."
        );
    }

    #[test]
    fn optional_items_go_to_general() {
        let mut optional = RequiredItem::new("Reference letters", ItemType::Document);
        optional.is_required = false;
        let items = vec![optional, RequiredItem::new("Staffing plan", ItemType::Information)];

        let questions = generate_clarification_questions(&items);
        assert_eq!(questions[0].section, Section::RequiredInformation);
        assert_eq!(questions[0].importance, "Required");
        assert_eq!(questions[1].section, Section::General);
        assert_eq!(questions[1].importance, "Optional");
    }

    #[test]
    fn suffixes_only_for_specified_fields() {
        let item = RequiredItem {
            item: "Bid bond".into(),
            page: "7".into(),
            requirements: "5% of bid amount".into(),
            item_type: ItemType::Document,
            is_required: true,
            format: "Original, notarized".into(),
        };
        let questions = generate_clarification_questions(&[item]);
        assert_eq!(
            questions[0].question,
            "Please provide a copy of the Bid bond (see page 7). \
             Requirements: 5% of bid amount Format: Original, notarized"
        );
        assert_eq!(questions[0].format, "Original, notarized");
    }

    #[test]
    fn names_are_cleaned_and_empty_names_skipped() {
        let items = vec![
            RequiredItem::new("-- ** --", ItemType::Form),
            RequiredItem::new("\"Exhibit A\":", ItemType::Form),
            RequiredItem::new("", ItemType::Information),
        ];
        let questions = generate_clarification_questions(&items);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Please complete and attach the Exhibit A.");
    }

    #[test]
    fn same_section_keeps_input_order() {
        let items = vec![
            RequiredItem::new("Second form", ItemType::Form),
            RequiredItem::new("Notes", ItemType::Information),
            RequiredItem::new("Third form", ItemType::Form),
        ];
        let questions = generate_clarification_questions(&items);
        assert!(questions[0].question.contains("Second form"));
        assert!(questions[1].question.contains("Third form"));
        assert!(questions[2].question.contains("Notes"));
    }
}
