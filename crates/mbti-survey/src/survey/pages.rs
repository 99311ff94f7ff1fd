use super::domain::LikertChoice;
use super::service::{ResultPage, TestPage};
use crate::web::escape_html;

const CHOICE_LABELS: [&str; 5] = [
    "Strongly disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly agree",
];

const AUTOSAVE_SCRIPT: &str = r#"<script>
document.querySelectorAll('.question input[type=radio]').forEach(function (input) {
  input.addEventListener('change', function () {
    var answers = {};
    answers[input.name] = input.value;
    fetch('/save-progress', {
      method: 'POST',
      headers: {'Content-Type': 'application/json'},
      credentials: 'same-origin',
      body: JSON.stringify({answers: answers})
    });
  });
});
</script>"#;

pub fn home(username: Option<&str>) -> String {
    let action = match username {
        Some(name) => format!(
            r#"<p>Welcome back, {}.</p><p><a href="/test">Start or continue the test</a> · <a href="/result">View my result</a></p>"#,
            escape_html(name)
        ),
        None => r#"<p><a href="/users/login">Log in</a> or <a href="/users/register">create an account</a> to take the test.</p>"#
            .to_string(),
    };

    format!(
        r#"<h1>MBTI Personality Test</h1>
<p>Answer each statement on a five-point scale from "strongly disagree" to "strongly agree".
Your answers are saved as you go, and your four-letter type is calculated when you submit.</p>
{action}"#
    )
}

pub fn test_page(page: &TestPage) -> String {
    let pagination = &page.pagination;
    let mut questions = String::new();

    for (index, question) in page.questions.iter().enumerate() {
        let number = pagination.offset + index + 1;
        let field = question.form_key();
        let saved = page.saved.get(&question.id).map(String::as_str);

        let mut options = String::new();
        for (value, label) in (LikertChoice::MIN..=LikertChoice::MAX).zip(CHOICE_LABELS) {
            let value = value.to_string();
            let checked = if saved == Some(value.as_str()) {
                " checked"
            } else {
                ""
            };
            options.push_str(&format!(
                r#"<label><input type="radio" name="{field}" value="{value}"{checked}> {label}</label>"#
            ));
        }

        questions.push_str(&format!(
            r#"<div class="question"><p><strong>{number}.</strong> {text}</p>{options}</div>
"#,
            text = escape_html(&question.text),
        ));
    }

    let mut pager = String::new();
    if pagination.has_previous() {
        pager.push_str(&format!(
            r#"<a href="/test?page={}">Previous page</a>"#,
            pagination.page - 1
        ));
    }
    if pagination.has_next() {
        pager.push_str(&format!(
            r#"<a href="/test?page={}">Next page</a>"#,
            pagination.page + 1
        ));
    } else {
        pager.push_str(r#"<button type="submit">Submit answers</button>"#);
    }

    let title = page
        .questionnaire
        .as_ref()
        .map(|questionnaire| escape_html(&questionnaire.name))
        .unwrap_or_else(|| "Personality test".to_string());

    format!(
        r#"<h1>{title}</h1>
<p>Page {page} of {total_pages} · {saved} of {total} answered</p>
<form method="post" action="/submit">
{questions}<p class="pager">{pager}</p>
</form>
{AUTOSAVE_SCRIPT}"#,
        page = pagination.page,
        total_pages = pagination.total_pages,
        saved = page.saved.len().min(page.total_questions),
        total = page.total_questions,
    )
}

pub fn result_page(result: &ResultPage) -> String {
    let view = &result.view;
    let mut rows = String::new();
    for detail in &view.dimensions {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{:+.2}</td><td>{:.2}</td><td>{}</td></tr>",
            detail.dimension.code(),
            detail.score,
            detail.confidence,
            detail.label
        ));
    }

    let profile = view
        .profile
        .as_ref()
        .map(|profile| {
            let mut block = format!("<p>{}</p>", escape_html(&profile.description));
            if !profile.strengths.trim().is_empty() {
                block.push_str(&format!(
                    "<h3>Strengths</h3><p>{}</p>",
                    escape_html(&profile.strengths)
                ));
            }
            if !profile.growth.trim().is_empty() {
                block.push_str(&format!(
                    "<h3>Growth</h3><p>{}</p>",
                    escape_html(&profile.growth)
                ));
            }
            block
        })
        .unwrap_or_default();

    format!(
        r#"<h1>Your type: {code}</h1>
<h2>{name}</h2>
{profile}
<table>
<thead><tr><th>Dimension</th><th>Score</th><th>Confidence</th><th>Tendency</th></tr></thead>
<tbody>{rows}</tbody>
</table>
<p><a href="/result/pdf">Download PDF report</a> · <a href="/test">Retake the test</a></p>
<section class="report">
{report}
</section>"#,
        code = view.type_code,
        name = escape_html(view.profile_name()),
        report = result.report_html,
    )
}

pub fn no_result() -> String {
    r#"<h1>No result yet</h1>
<p>You have not completed the test. <a href="/test">Take the test</a> to see your personality type.</p>"#
        .to_string()
}
