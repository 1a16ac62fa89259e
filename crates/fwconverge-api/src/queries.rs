// GraphQL documents for the policy endpoint.
//
// Selection sets are assembled at compile time with `concat!`; the
// family-specific field name and input type prefix are spliced in when
// a document is built.

macro_rules! ref_fields {
    () => {
        "{ id name }"
    };
}

macro_rules! endpoint_fields {
    () => {
        concat!(
            "host ", ref_fields!(),
            " site ", ref_fields!(),
            " subnet ip ipRange { from to }",
            " globalIpRange ", ref_fields!(),
            " networkInterface { id name socketModel interfaceId }",
            " siteNetworkSubnet ", ref_fields!(),
            " floatingSubnet ", ref_fields!(),
            " user ", ref_fields!(),
            " usersGroup ", ref_fields!(),
            " group ", ref_fields!(),
            " systemGroup ", ref_fields!()
        )
    };
}

macro_rules! application_fields {
    () => {
        concat!(
            "application ", ref_fields!(),
            " customApp ", ref_fields!(),
            " appCategory ", ref_fields!(),
            " customCategory ", ref_fields!(),
            " sanctionedAppsCategory ", ref_fields!(),
            " domain fqdn ip subnet ipRange { from to }",
            " globalIpRange ", ref_fields!()
        )
    };
}

macro_rules! internet_destination_fields {
    () => {
        concat!(
            application_fields!(),
            " country ", ref_fields!(),
            " remoteAsn"
        )
    };
}

macro_rules! shared_rule_fields {
    () => {
        concat!(
            "connectionOrigin country ", ref_fields!(),
            " device ", ref_fields!(),
            " deviceOS deviceAttributes { category type model manufacturer os osVersion }",
            " service { standard ", ref_fields!(), " custom { port portRange { from to } protocol } }"
        )
    };
}

macro_rules! rule_header_fields {
    () => {
        concat!(
            "id name description index enabled section ", ref_fields!(),
            " action tracking { event { enabled } alert { enabled frequency subscriptionGroup ",
            ref_fields!(), " webhook ", ref_fields!(), " mailingList ", ref_fields!(), " } }",
            " schedule { activeOn customTimeframe { from to } customRecurring { from to days } }",
            " activePeriod { effectiveFrom expiresAt useEffectiveFrom useExpiresAt }"
        )
    };
}

pub(crate) const WAN_RULE_SELECTION: &str = concat!(
    rule_header_fields!(),
    " direction source { ", endpoint_fields!(), " }",
    " destination { ", endpoint_fields!(), " }",
    " application { ", application_fields!(), " } ",
    shared_rule_fields!(),
    " exceptions { name direction source { ", endpoint_fields!(), " }",
    " destination { ", endpoint_fields!(), " }",
    " application { ", application_fields!(), " } ",
    shared_rule_fields!(),
    " }"
);

pub(crate) const INTERNET_RULE_SELECTION: &str = concat!(
    rule_header_fields!(),
    " source { ", endpoint_fields!(), " }",
    " destination { ", internet_destination_fields!(), " } ",
    shared_rule_fields!(),
    " exceptions { name source { ", endpoint_fields!(), " }",
    " destination { ", internet_destination_fields!(), " } ",
    shared_rule_fields!(),
    " }"
);

const MUTATION_STATUS: &str = "status errors { errorCode errorMessage }";

/// `policy { <field> { policy { ... } } }`
pub(crate) fn policy_query(field: &str, selection: &str) -> String {
    format!(
        "query policy($accountId: ID!) {{ policy(accountId: $accountId) {{ {field} {{ policy {{ \
         enabled rules {{ properties rule {{ {selection} }} }} \
         sections {{ properties section {{ id name }} }} revision {{ id name }} }} }} }} }}"
    )
}

/// Add / update / move: mutations that answer with the affected rule.
pub(crate) fn rule_mutation(operation: &str, field: &str, input_type: &str, selection: &str) -> String {
    format!(
        "mutation {operation}($accountId: ID!, $input: {input_type}!) {{ \
         policy(accountId: $accountId) {{ {field} {{ {operation}(input: $input) {{ \
         {MUTATION_STATUS} rule {{ rule {{ {selection} }} }} }} }} }} }}"
    )
}

/// Remove / publish: mutations that answer with a status block only.
pub(crate) fn status_mutation(operation: &str, field: &str, input_type: &str) -> String {
    format!(
        "mutation {operation}($accountId: ID!, $input: {input_type}!) {{ \
         policy(accountId: $accountId) {{ {field} {{ {operation}(input: $input) {{ \
         {MUTATION_STATUS} }} }} }} }}"
    )
}
