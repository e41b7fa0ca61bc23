/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use quick_xml::Writer;

use crate::{ops::Operation, response::response_messages, soap::ResponseEnvelope, value::Value};

/// Assert the expected result of XML serialization.
pub fn assert_serialized_content<O: Operation>(operation: &O, expected_xml_content: &str) {
    let mut writer = {
        let inner: Vec<u8> = Default::default();
        Writer::new(inner)
    };

    operation
        .to_value()
        .unwrap()
        .serialize_into(&mut writer, O::NAME, 0)
        .unwrap();

    let buf = writer.into_inner();
    let actual_xml_content = std::str::from_utf8(buf.as_slice()).unwrap();

    assert_eq!(actual_xml_content, expected_xml_content);
}

/// Parses a response document and returns the content of the named
/// operation's single response message.
pub fn parse_response_message(document: &str, operation_name: &str) -> Value {
    let envelope = ResponseEnvelope::parse(document).unwrap();
    let response = envelope.operation_response(operation_name).unwrap();
    let messages = response_messages(response, operation_name).unwrap();

    assert_eq!(
        messages.len(),
        1,
        "test document should contain a single response message"
    );

    messages[0].content().clone()
}
