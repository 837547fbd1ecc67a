//! Article templates
//!
//! Two kinds of template live here: the outline skeleton embedded in the
//! generation prompt for each content type, and the structured section
//! templates a finished article can be validated against.

use copysmith_core::ContentType;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

const PRODUCT_REVIEW_OUTLINE: &str = "
## Introduction
- Product overview
- Key specifications
- Target audience

## Main Features
- Core capabilities
- Standout features
- Technical specifications

## Performance
- Real-world testing
- User experience
- Key findings

## Pros and Cons
- Key advantages
- Notable limitations

## Verdict
- Final rating
- Recommendations
- Who should buy";

const PRODUCT_ROUNDUP_OUTLINE: &str = "
## Introduction
- Overview of category
- Why these products
- Selection criteria

## Best Overall Pick
- Product name and specs
- Why it's the best
- Key features
- Who it's for

## Best Value Pick
- Product name and specs
- Value proposition
- Key features
- Who it's for

## Premium Choice
- Product name and specs
- Premium features
- Why it's worth more
- Who it's for

## Comparison Overview
[Comparison table if enabled]

## Buying Advice
- What to consider
- Common features
- Price expectations";

const PRODUCT_COMPARISON_OUTLINE: &str = "
## Overview
- Products introduction
- Main differences
- Target users

## Direct Comparison
[Comparison table if enabled]
- Design and build
- Features
- Performance
- Price

## Real-World Usage
- Practical differences
- User experiences
- Common scenarios

## Which One to Choose
- Use case scenarios
- Best value option
- Final verdict";

const HOWTO_GUIDE_OUTLINE: &str = "
## Introduction
- Purpose
- Difficulty level
- Time needed
- Required items

## Preparation Steps
- What you need
- Setup required
- Safety considerations

## Step-by-Step Instructions
### Step 1: Getting Started
- Detailed instructions
- Tips and tricks
- Common mistakes

### Step 2: Main Process
[Continue with relevant steps]

## Tips for Success
- Expert advice
- Best practices
- Troubleshooting

## Conclusion
- Final tips
- Expected results
- Next steps";

const BUYERS_GUIDE_OUTLINE: &str = "
## Introduction
- Market overview
- Price ranges
- Key considerations

## What to Look For
- Essential features
- Optional features
- Red flags

## Top Recommendations
- Best overall
- Best value
- Premium pick
- Budget option

## How to Choose
- Decision factors
- Common pitfalls
- Shopping tips

## Conclusion
- Final advice
- Where to buy
- Additional resources";

const EXPLANATION_ARTICLE_OUTLINE: &str = "
## Introduction
- Topic overview
- Why it matters
- Basic concept

## Core Concepts
- Main ideas
- Key terminology
- Fundamental principles

## Detailed Explanation
- In-depth analysis
- Examples
- Applications

## Common Questions
- FAQ section
- Misconceptions
- Expert insights

## Practical Applications
- Real-world uses
- Examples
- Best practices

## Summary
- Key takeaways
- Further reading
- Next steps";

/// Outline embedded in the generation prompt
pub fn outline_skeleton(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::ProductReview => PRODUCT_REVIEW_OUTLINE,
        ContentType::ProductRoundup => PRODUCT_ROUNDUP_OUTLINE,
        ContentType::ProductComparison => PRODUCT_COMPARISON_OUTLINE,
        ContentType::HowtoGuide => HOWTO_GUIDE_OUTLINE,
        ContentType::BuyersGuide => BUYERS_GUIDE_OUTLINE,
        ContentType::ExplanationArticle => EXPLANATION_ARTICLE_OUTLINE,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionTemplate {
    pub key: &'static str,
    pub title: &'static str,
    pub elements: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentTemplate {
    pub name: &'static str,
    pub sections: Vec<SectionTemplate>,
}

impl ContentTemplate {
    /// Markdown section skeleton, filling elements present in `data`
    pub fn generate_structure(&self, data: &HashMap<String, String>) -> String {
        let mut output = String::new();
        for section in &self.sections {
            output.push_str(&format!("\n## {}\n\n", section.title));
            for element in section.elements {
                if let Some(value) = data.get(*element) {
                    output.push_str(value);
                    output.push_str("\n\n");
                }
            }
        }
        output
    }
}

fn section(
    key: &'static str,
    title: &'static str,
    elements: &'static [&'static str],
) -> SectionTemplate {
    SectionTemplate {
        key,
        title,
        elements,
    }
}

static PRODUCT_REVIEW_TEMPLATE: LazyLock<ContentTemplate> = LazyLock::new(|| ContentTemplate {
    name: "Product Review",
    sections: vec![
        section(
            "introduction",
            "Introduction",
            &["product_overview", "key_features", "target_audience", "value_proposition"],
        ),
        section(
            "details",
            "Product Details",
            &["specifications", "features_breakdown", "use_cases", "package_contents"],
        ),
        section(
            "analysis",
            "Performance Analysis",
            &[
                "testing_methodology",
                "performance_results",
                "user_experience",
                "benchmark_comparisons",
            ],
        ),
        section(
            "evaluation",
            "Pros and Cons",
            &["advantages", "limitations", "deal_breakers", "best_use_cases"],
        ),
        section(
            "pricing",
            "Price Analysis",
            &["current_pricing", "price_comparison", "value_assessment", "deals_availability"],
        ),
        section(
            "verdict",
            "Final Verdict",
            &["overall_rating", "recommendations", "purchase_advice", "alternatives"],
        ),
    ],
});

static COMPARISON_TEMPLATE: LazyLock<ContentTemplate> = LazyLock::new(|| ContentTemplate {
    name: "Product Comparison",
    sections: vec![section(
        "overview",
        "Overview",
        &["products_introduction", "market_positioning", "target_audience", "price_ranges"],
    )],
});

/// Structured template for `template_type`, the product review template
/// when unknown
pub fn structured_template(template_type: &str) -> &'static ContentTemplate {
    match template_type.trim() {
        "comparison" | "product_comparison" => &COMPARISON_TEMPLATE,
        _ => &PRODUCT_REVIEW_TEMPLATE,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateValidation {
    pub is_valid: bool,
    pub missing_sections: Vec<String>,
}

/// Check that every section of the template appears as a `## <title>` heading
pub fn validate_content(markdown: &str, template_type: &str) -> TemplateValidation {
    let missing_sections: Vec<String> = structured_template(template_type)
        .sections
        .iter()
        .filter(|s| !markdown.contains(&format!("## {}", s.title)))
        .map(|s| s.title.to_string())
        .collect();

    TemplateValidation {
        is_valid: missing_sections.is_empty(),
        missing_sections,
    }
}

/// Feature toggles offered for a template type, defaults included
pub fn template_options(template_type: &str) -> BTreeMap<&'static str, bool> {
    let mut options = BTreeMap::from([
        ("comparison_table", true),
        ("pros_cons", true),
        ("pricing_table", true),
        ("faq_section", false),
    ]);

    let specific: &[(&str, bool)] = match template_type.trim() {
        "product_review" => &[("user_reviews", true), ("alternatives", true)],
        "comparison" | "product_comparison" => {
            &[("feature_breakdown", true), ("verdict_summary", true)]
        }
        "buyers_guide" => &[("buying_checklist", true), ("price_comparison", true)],
        _ => &[],
    };
    options.extend(specific.iter().copied());
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_an_outline() {
        for content_type in ContentType::ALL {
            assert!(outline_skeleton(content_type).contains("## Introduction")
                || outline_skeleton(content_type).contains("## Overview"));
        }
    }

    #[test]
    fn test_validate_complete_review() {
        let markdown = "## Introduction\n\n## Product Details\n\n## Performance Analysis\n\
                        ## Pros and Cons\n## Price Analysis\n## Final Verdict\n";
        let result = validate_content(markdown, "product_review");

        assert!(result.is_valid);
        assert!(result.missing_sections.is_empty());
    }

    #[test]
    fn test_validate_reports_missing_sections_in_order() {
        let result = validate_content("## Introduction\n## Final Verdict", "product_review");

        assert!(!result.is_valid);
        assert_eq!(
            result.missing_sections,
            vec!["Product Details", "Performance Analysis", "Pros and Cons", "Price Analysis"]
        );
    }

    #[test]
    fn test_unknown_type_uses_review_template() {
        assert_eq!(structured_template("podcast").name, "Product Review");
        assert_eq!(structured_template("product_comparison").sections.len(), 1);
        assert!(validate_content("## Overview", "comparison").is_valid);
    }

    #[test]
    fn test_template_options_merge() {
        let review = template_options("product_review");
        assert_eq!(review.len(), 6);
        assert_eq!(review.get("faq_section"), Some(&false));
        assert_eq!(review.get("user_reviews"), Some(&true));

        assert_eq!(template_options("howto_guide").len(), 4);
        assert!(template_options("buyers_guide").contains_key("buying_checklist"));
    }

    #[test]
    fn test_generate_structure_fills_known_elements() {
        let data = HashMap::from([("price_ranges".to_string(), "From $99".to_string())]);
        let skeleton = structured_template("comparison").generate_structure(&data);

        assert_eq!(skeleton, "\n## Overview\n\nFrom $99\n\n");
    }
}
