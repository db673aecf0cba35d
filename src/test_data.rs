#[cfg(test)]
pub const POST_HEADER: &str = ";;;;;
title: Learning to cook in Lisbon
tags: travel, food, code
format: markdown
date: 2021-03-05
author: brit
;;;;;
";

#[cfg(test)]
pub const POST_BODY: &str = "The first week in Lisbon I ate bacalhau every single day.

Then I decided to learn how to cook it myself.

;;;;;
The line above is part of the body, not a header.
";

#[cfg(test)]
pub fn post_data() -> String {
    format!("{}{}", POST_HEADER, POST_BODY)
}
