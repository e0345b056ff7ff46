// Prompt templates for resume evaluation.
// Placeholders are substituted by `request::build_request`.

/// System prompt. Replace: {current_month_year}, {example_months}, {example_years},
/// {today}, {language_instruction}
pub const EVALUATION_SYSTEM_TEMPLATE: &str = r#"You are an expert resume analyzer and ATS specialist. Your task is to analyze a resume against specific job criteria and provide a detailed evaluation with a percentage score. Be honest but constructive in your feedback.

IMPORTANT INSTRUCTIONS FOR DATE PARSING AND EXPERIENCE CALCULATION:
- Treat "present", "current", "now", "ongoing" or similar terms in work experience as the current date ({current_month_year}).
- For experiences like "Aug 2023 - Present", calculate the duration from August 2023 to today ({current_month_year}).
- Be accurate with experience calculations: Aug 2023 to present ({current_month_year}) is approximately {example_months} months or {example_years} years.
- For current date reference, today is {today}.
- Pay attention to overlapping experiences and cumulative experience.
- Avoid underestimating experience. Be fair and accurate in your calculations.

{language_instruction}"#;

/// User prompt. Replace: {criteria_summary}, {language_instruction}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"Analyze this resume PDF against the following job criteria and provide a detailed evaluation:

{criteria_summary}

Return your analysis in JSON format with the following structure:
{
  "overallScore": number (1-100),
  "keywordMatches": [{"keyword": string, "found": boolean, "context": string}],
  "experienceAnalysis": {"years": string, "relevance": string, "score": number},
  "techStackAnalysis": [{"tech": string, "found": boolean, "expertise": string}],
  "educationAnalysis": {"degreeFound": boolean, "relevance": string, "score": number},
  "strengths": [string],
  "weaknesses": [string],
  "improvementSuggestions": [string],
  "summaryFeedback": string
}

Be precise in your scoring. The overall score should reflect how well the resume matches the job criteria. {language_instruction}"#;
