use serde_json::{json, Value};

use crate::common::{error_kind, run_app_test, user_ids};

#[tokio::test]
async fn revoke_and_grant_category() {
    run_app_test(|app| async move {
        let design = app.info.category_ids[0].to_string();
        let regular = app.info.regular_user.user_id.to_string();
        let admin = app.info.admin_user.user_id.to_string();
        let members_url = format!("categories/{design}/assignees");

        // Nobody has an assignment yet, so everyone active can see the category.
        let members: Value = app.admin.get(&members_url).send().await?.json().await?;
        assert_eq!(user_ids(&members), vec![admin.clone(), regular.clone()]);

        let response = app
            .admin
            .delete(&format!("{members_url}/{regular}"))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 200);

        let members: Value = app.admin.get(&members_url).send().await?.json().await?;
        assert_eq!(user_ids(&members), vec![admin.clone()]);

        // The other category is unaffected.
        let visible: Value = app
            .admin
            .get(&format!(
                "projects/{}/users/{regular}/categories",
                app.info.project_id
            ))
            .send()
            .await?
            .json()
            .await?;
        let names = visible
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Engineering".to_string()]);

        // Revoking again changes nothing.
        let response = app
            .admin
            .delete(&format!("{members_url}/{regular}"))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 200);

        let response = app
            .admin
            .post(&members_url)
            .json(&json!({ "userId": regular }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 201);

        let members: Value = app.admin.get(&members_url).send().await?.json().await?;
        assert_eq!(user_ids(&members), vec![admin, regular]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn selected_scope() {
    run_app_test(|app| async move {
        let engineering = app.info.category_ids[1].to_string();
        let regular = app.info.regular_user.user_id.to_string();
        let access_url = format!("projects/{}/users/{regular}/access", app.info.project_id);

        let response = app
            .admin
            .put(&access_url)
            .json(&json!({ "mode": "selected", "categories": [engineering] }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 200);
        let assignment: Value = response.json().await?;
        assert_eq!(assignment["categoryAccessMode"], "selected");

        let design_members: Value = app
            .admin
            .get(&format!("categories/{}/assignees", app.info.category_ids[0]))
            .send()
            .await?
            .json()
            .await?;
        assert!(!user_ids(&design_members).contains(&regular));

        // Granting a category in selected mode adds it to the list.
        let response = app
            .admin
            .post(&format!("categories/{}/assignees", app.info.category_ids[0]))
            .json(&json!({ "userId": regular }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 201);

        let visible: Value = app
            .admin
            .get(&format!(
                "projects/{}/users/{regular}/categories",
                app.info.project_id
            ))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(visible.as_array().map(|v| v.len()), Some(2));

        let response = app
            .admin
            .put(&access_url)
            .json(&json!({ "mode": "all", "categories": [engineering] }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 400);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn rejections() {
    run_app_test(|app| async move {
        let design = app.info.category_ids[0].to_string();
        let admin = app.info.admin_user.user_id.to_string();
        let regular = app.info.regular_user.user_id.to_string();
        let members_url = format!("categories/{design}/assignees");

        let response = app.anonymous.get(&members_url).send().await?;
        assert_eq!(response.status().as_u16(), 401);

        let regular_client = app.client_for(&app.info.regular_user).await?;
        let response = regular_client
            .delete(&format!("{members_url}/{admin}"))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 403);
        assert_eq!(error_kind(response).await?, "forbidden");

        // Non-admins are turned away before the body is validated.
        let response = regular_client
            .put(&format!(
                "projects/{}/users/{regular}/access",
                app.info.project_id
            ))
            .json(&json!({ "mode": "all", "categories": [design] }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 403);
        assert_eq!(error_kind(response).await?, "forbidden");

        let response = app
            .admin
            .delete(&format!(
                "categories/{}/assignees/{regular}",
                app.info.global_category_id
            ))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 404);
        assert_eq!(error_kind(response).await?, "not_applicable");

        let response = app
            .admin
            .post(&members_url)
            .json(&json!({ "userId": planner_db::object_id::UserId::new() }))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 404);
        assert_eq!(error_kind(response).await?, "not_found");

        let response = app
            .admin
            .get(&format!(
                "categories/{}/assignees",
                planner_db::object_id::CategoryId::new()
            ))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 404);

        // A deactivated admin keeps their cookie but loses access.
        app.set_active(app.info.admin_user.user_id, false).await?;
        let response = app.admin.get(&members_url).send().await?;
        assert_eq!(response.status().as_u16(), 403);
        assert_eq!(error_kind(response).await?, "account_deactivated");

        Ok(())
    })
    .await
}
