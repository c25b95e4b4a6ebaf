use starkly_core::classify::CATEGORY_RULES;
use starkly_core::error::StarklyError;
use starkly_core::model::IssueCategory;

pub fn list() -> Result<(), StarklyError> {
    println!("Issue categories, first match wins:\n");
    for (i, (category, pattern)) in CATEGORY_RULES.iter().enumerate() {
        println!("  {:>2}. {:<16} {}", i + 1, category.to_string(), pattern);
    }
    println!(
        "  {:>2}. {:<16} (anything else)",
        CATEGORY_RULES.len() + 1,
        IssueCategory::Other.to_string()
    );
    Ok(())
}
