// Match explanation prompt templates.

pub const EXPLAIN_MATCH_PROMPT: &str = "\
Given the following resume skills and job-required skills, provide a short explanation (1-2 sentences) \
of the match and list the top 3 reasons the candidate is a good or poor fit. \
Return as JSON with keys 'explanation' (string) and 'reasons' (array of strings).

Resume skills: {resume_skills}
Job skills: {job_skills}
Matched: {matched}
Missing: {missing}
Score: {score}/100";
