/*
 * File: /src/util.rs
 * Created Date: Tuesday, June 18th 2024
 * Author: Zihan
 * -----
 * Last Modified: Wednesday, 14th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-14		Zihan	Label encoding for string cluster labels
**/
use std::collections::{BTreeMap, BTreeSet};

/// Map labels to dense codes `0..n_distinct`, in sorted label order.
///
/// Returns the codes and the distinct labels they index.
pub fn encode_labels<S: AsRef<str>>(labels: &[S]) -> (Vec<usize>, Vec<String>) {
    let mut codes: BTreeMap<&str, usize> = labels.iter().map(|l| (l.as_ref(), 0)).collect();
    for (code, slot) in codes.values_mut().enumerate() {
        *slot = code;
    }
    let encoded = labels.iter().map(|l| codes[l.as_ref()]).collect();
    let names = codes.keys().map(|k| k.to_string()).collect();
    (encoded, names)
}

pub fn count_distinct<S: AsRef<str>>(labels: &[S]) -> usize {
    labels.iter().map(AsRef::as_ref).collect::<BTreeSet<&str>>().len()
}

/// Class-count filter from `3` or `3_classes`
pub fn parse_batch(text: &str) -> Option<usize> {
    let digits = text.strip_suffix("_classes").unwrap_or(text);
    digits.parse::<usize>().ok().filter(|&n| n > 0)
}
