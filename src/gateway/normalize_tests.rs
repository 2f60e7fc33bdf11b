use super::*;
use serde_json::json;

#[test]
fn pick_skips_missing_and_null() {
    let v = json!({"users": null, "Users": [1], "data": []});
    assert_eq!(pick(&v, &["users", "Users"]), Some(&json!([1])));
    assert_eq!(pick(&v, &["nope"]), None);
    assert_eq!(pick_str(&json!({"UserID": 12}), &["userId", "UserID"]).as_deref(), Some("12"));
}

#[test]
fn users_page_camel_and_pascal() {
    let camel = json!({
        "users": [{"userID": "a", "email": "a@x", "personName": "A", "gender": "Male", "isActive": true, "roles": ["User"]}],
        "pagination": {"currentPage": 2, "pageSize": 10, "totalCount": 11, "totalPages": 2}
    });
    let p = users_page(&camel, 2, 10);
    assert_eq!(p.data.len(), 1);
    assert_eq!(p.data[0].user_id, "a");
    assert_eq!(p.data[0].roles, vec!["User".to_string()]);
    assert_eq!(p.pagination.total_count, 11);
    assert!(!p.pagination.has_next());

    let pascal = json!({
        "Users": [{"UserId": "b", "Email": "b@x", "IsActive": false, "Roles": [{"name": "Manager"}]}],
        "Pagination": {"CurrentPage": 1, "PageSize": 20, "TotalCount": 40, "TotalPages": 2}
    });
    let p = users_page(&pascal, 1, 20);
    assert_eq!(p.data[0].user_id, "b");
    assert_eq!(p.data[0].roles, vec!["Manager".to_string()]);
    assert!(p.pagination.has_next());
}

#[test]
fn users_page_defaults_when_unwrapped_fields_missing() {
    let p = users_page(&json!({}), 3, 25);
    assert!(p.data.is_empty());
    assert_eq!(p.pagination, Pagination { current_page: 3, page_size: 25, total_count: 0, total_pages: 0 });
}

#[test]
fn user_detail_merges_role_objects() {
    let raw = json!({
        "User": {"userID": "u1", "email": "e@x", "isActive": true},
        "Roles": ["Admin", {"roleName": "Manager"}, {"name": ""}, 5]
    });
    let u = user_detail(&raw).unwrap();
    assert_eq!(u.user_id, "u1");
    assert_eq!(u.roles, vec!["Admin".to_string(), "Manager".to_string()]);
    assert!(user_detail(&json!({"nothing": true})).is_none());
}

#[test]
fn user_detail_ignores_nested_roles() {
    let raw = json!({"user": {"userID": "u2", "roles": ["Admin"]}});
    assert!(user_detail(&raw).unwrap().roles.is_empty());
    let raw = json!({"user": {"userID": "u2", "roles": ["Admin"]}, "roles": null, "Roles": ["User"]});
    assert_eq!(user_detail(&raw).unwrap().roles, vec!["User".to_string()]);
}

#[test]
fn role_list_accepts_both_id_spellings() {
    let raw = json!({"Roles": [{"roleId": "1", "roleName": "Admin"}, {"roleID": "2", "name": "User"}, {"roleID": "3"}]});
    let roles = role_list(&raw);
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[0], RoleInfo { role_id: Some("1".into()), name: "Admin".into() });
    assert_eq!(roles[1].name, "User");
}

#[test]
fn activity_logs_shape_variants() {
    let entry = json!({"id": 1, "adminId": "a", "adminName": "Root", "action": "ToggleStatus", "timestamp": "2024-03-01T10:00:00Z", "details": "x"});
    let variants = [
        json!({"data": [entry.clone()], "pagination": {"currentPage": 1, "pageSize": 50, "totalCount": 1, "totalPages": 1}}),
        json!({"logs": [entry.clone()], "pagination": {"currentPage": 1, "pageSize": 50, "totalCount": 1, "totalPages": 1}}),
        json!({"activityLogs": [entry.clone()], "pagination": {"currentPage": 1, "pageSize": 50, "totalCount": 1, "totalPages": 1}}),
        json!({"ActivityLogs": {"Items": [entry.clone()], "Pagination": {"CurrentPage": 1, "PageSize": 50, "TotalCount": 1, "TotalPages": 1}}}),
        json!({"activityLogs": {"data": [entry.clone()]}, "pagination": {"currentPage": 1, "pageSize": 50, "totalCount": 1, "totalPages": 1}}),
    ];
    for raw in variants.iter() {
        let page = activity_logs_page(raw, 1, 50);
        assert_eq!(page.data.len(), 1, "shape {}", raw);
        assert_eq!(page.data[0].id, "1");
        assert_eq!(page.pagination.total_count, 1, "shape {}", raw);
    }

    let empty = activity_logs_page(&json!({"unexpected": 1}), 4, 50);
    assert!(empty.data.is_empty());
    assert_eq!(empty.pagination.current_page, 4);
}

#[test]
fn activity_log_timestamps() {
    let mut log = ActivityLog { timestamp: "2024-03-01T10:00:00+02:00".into(), ..Default::default() };
    assert_eq!(log.timestamp_utc().unwrap().to_rfc3339(), "2024-03-01T08:00:00+00:00");
    log.timestamp = "2024-03-01T10:00:00.1234567".into();
    assert!(log.timestamp_utc().is_some());
    log.timestamp = "yesterday".into();
    assert!(log.timestamp_utc().is_none());
}

#[test]
fn system_settings_wrappers() {
    let s = json!({
        "applicationName": "Staff", "version": "1.2", "environment": "Development",
        "maxUsersPerRole": {"Admin": 5},
        "securitySettings": {"passwordMinLength": 8, "requireEmailConfirmation": false, "sessionTimeoutMinutes": 30}
    });
    for raw in [json!({"settings": s.clone()}), json!({"Data": s.clone()}), json!({"SystemSettings": s.clone()}), s.clone()] {
        let parsed = system_settings(&raw);
        assert_eq!(parsed.application_name, "Staff");
        assert_eq!(parsed.security_settings.password_min_length, 8);
        assert_eq!(parsed.max_users_per_role.get("Admin"), Some(&5));
    }
}

#[test]
fn dashboard_stats_unwraps() {
    let raw = json!({"stats": {
        "totalUsers": 3,
        "usersByRole": {"Admin": 1, "User": 2},
        "recentUsers": [{"userID": "n", "email": "n@x"}],
        "systemInfo": {"serverTime": "2024-01-01T00:00:00Z", "version": "1.0"}
    }});
    let st = dashboard_stats(&raw);
    assert_eq!(st.total_users, 3);
    assert_eq!(st.users_by_role.get("User"), Some(&2));
    assert_eq!(st.recent_users[0].user_id, "n");
    assert_eq!(st.system_info.unwrap().version, "1.0");
}

#[test]
fn manager_lists_unwrap() {
    let t = json!({"id": 1});
    assert_eq!(unwrap_list(&json!([t.clone()]), &["tasks", "Tasks"]).len(), 1);
    assert_eq!(unwrap_list(&json!({"data": [t.clone()]}), &["tasks", "Tasks"]).len(), 1);
    assert_eq!(unwrap_list(&json!({"Tasks": [t.clone(), t.clone()]}), &["tasks", "Tasks"]).len(), 2);
    assert_eq!(unwrap_list(&json!({"data": {"tasks": [t.clone()]}}), &["tasks", "Tasks"]).len(), 1);
    assert!(unwrap_list(&json!({"data": {"other": []}}), &["tasks", "Tasks"]).is_empty());
    assert!(unwrap_list(&json!("nope"), &["tasks"]).is_empty());
}

#[test]
fn manager_profile_shapes() {
    let flat = json!({"userId": "m1", "email": "m@x", "fullName": "Mo", "roles": [{"role": "Manager"}]});
    let p = manager_profile(&flat);
    assert_eq!(p.user.user_id.as_deref(), Some("m1"));
    assert_eq!(p.user.name.as_deref(), Some("Mo"));
    assert_eq!(p.roles, vec!["Manager".to_string()]);

    let nested = json!({"Profile": {"User": {"UserID": "m2", "Email": "m2@x", "PersonName": "Mia"}}, "Roles": ["Manager", "User"]});
    let p = manager_profile(&nested);
    assert_eq!(p.user.user_id.as_deref(), Some("m2"));
    assert_eq!(p.user.name.as_deref(), Some("Mia"));
    assert_eq!(p.roles.len(), 2);
}

#[test]
fn team_page_reads_data_key() {
    let raw = json!({"data": [{"userID": "t1"}, "garbage"], "pagination": null});
    let p = team_page(&raw, 1, 20);
    assert_eq!(p.data.len(), 1);
    assert_eq!(p.pagination, Pagination::empty(1, 20));
}
